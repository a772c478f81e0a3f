//! The sub-interpreter driver: `test`, `step`, `undo` (spec §4.6
//! "Sub-interpreter"). Each pops a program value, clones it into a fresh,
//! independently ref-counted document, runs it, and pushes the result (or,
//! for `test`, a structured error on mismatch) back onto the outer stack.
//! Per spec §9 "Sub-interpreter isolation", each gets its own
//! [`Interpreter`] and pointer-handle stack rather than sharing the outer
//! one.

use serde_json::{Map, Number, Value};

use crate::document::{Document, DocHandle};
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::residual::{self, Group};

use super::support;

/// `test`: pops `[program, expected]` (expected on top). Runs `program`'s
/// `entrypoint` to completion in a fresh sub-document and compares the
/// resulting root against `expected` by structural subset equality. On
/// mismatch — including the program itself failing — pushes a structured
/// error object (spec §6) onto the outer stack; the outer interpreter is
/// never aborted by a `test` failure (spec §4.7).
pub fn test(doc: &DocHandle) -> Result<(), Error> {
    let (expected, expected_patch) = support::pop(doc)?;
    let (program, program_patch) = support::pop(doc)?;

    let sub_doc = Document::new(program);
    crate::document::root_mut(&sub_doc).retain();

    let mut sub_interp = Interpreter::new();
    let run_result = sub_interp.process_entrypoint(&sub_doc);

    let mut group = Group::new();
    group.push(expected_patch);
    group.push(program_patch);

    match run_result {
        Ok(()) => {
            let actual = sub_doc.borrow().root().clone();
            if !subset_equals(&actual, &expected) {
                let error_obj = structured_error(
                    "TestMismatch",
                    "test: actual does not subset-equal expected",
                    Some(&expected),
                    Some(&actual),
                );
                let add_patch = support::push(doc, error_obj)?;
                group.push(add_patch);
            }
        }
        Err(err) => {
            let error_obj = structured_error(err.kind(), &err.to_string(), Some(&expected), None);
            let add_patch = support::push(doc, error_obj)?;
            group.push(add_patch);
        }
    }
    group.commit(doc);
    Ok(())
}

/// `step`: pops a program object, creates a sub-document, reads or
/// initializes `pc`, executes the single instruction at `entrypoint[pc]`,
/// increments `pc`, and pushes the resulting sub-root back onto the outer
/// stack.
pub fn step(doc: &DocHandle) -> Result<(), Error> {
    let (program, program_patch) = support::pop(doc)?;
    let sub_doc = Document::new(program);
    crate::document::root_mut(&sub_doc).retain();

    let pc = sub_doc
        .borrow()
        .root()
        .get("pc")
        .and_then(Value::as_u64)
        .unwrap_or(0) as usize;

    let entrypoint = sub_doc
        .borrow()
        .root()
        .get("entrypoint")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut sub_interp = Interpreter::new();
    if pc < entrypoint.len() {
        sub_interp.step_instruction(&sub_doc, &entrypoint, "/", pc)?;
    }

    {
        let mut guard = crate::document::root_mut(&sub_doc);
        if let Value::Object(map) = guard.root_mut() {
            map.insert("pc".to_string(), Value::Number(Number::from(pc as u64 + 1)));
        }
    }

    let result = sub_doc.borrow().root().clone();
    let mut group = Group::new();
    group.push(program_patch);
    let add_patch = support::push(doc, result)?;
    group.push(add_patch);
    group.commit(doc);
    Ok(())
}

/// `undo`: pops a program object into a fresh sub-document and runs one
/// step of residual undo on it (spec §4.4), pushing the resulting sub-root
/// back onto the outer stack.
pub fn undo(doc: &DocHandle) -> Result<(), Error> {
    let (program, program_patch) = support::pop(doc)?;
    let sub_doc = Document::new(program);
    crate::document::root_mut(&sub_doc).retain();

    residual::undo(&sub_doc)?;

    let result = sub_doc.borrow().root().clone();
    let mut group = Group::new();
    group.push(program_patch);
    let add_patch = support::push(doc, result)?;
    group.push(add_patch);
    group.commit(doc);
    Ok(())
}

/// Build the structured error object spec §6 describes.
fn structured_error(
    kind: &str,
    message: &str,
    expected: Option<&Value>,
    actual: Option<&Value>,
) -> Value {
    let mut obj = Map::new();
    obj.insert("error".to_string(), Value::Bool(true));
    obj.insert("kind".to_string(), Value::String(kind.to_string()));
    obj.insert("message".to_string(), Value::String(message.to_string()));
    if expected.is_some() || actual.is_some() {
        let mut details = Map::new();
        if let Some(e) = expected {
            details.insert("expected".to_string(), e.clone());
        }
        if let Some(a) = actual {
            details.insert("actual".to_string(), a.clone());
        }
        obj.insert("details".to_string(), Value::Object(details));
    }
    Value::Object(obj)
}

/// Structural subset equality (spec §4.6): types must match; for objects,
/// every key in `expected` must be present in `actual` with a subset-equal
/// value (extra keys in `actual` are ignored); sequences and scalars require
/// strict equality.
pub fn subset_equals(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(a), Value::Object(e)) => e
            .iter()
            .all(|(k, ev)| a.get(k).is_some_and(|av| subset_equals(av, ev))),
        (Value::Array(a), Value::Array(e)) => a == e,
        (a, e) => a == e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    #[test]
    fn subset_equals_ignores_extra_actual_keys() {
        let actual = json!({"a": 1, "b": 2});
        let expected = json!({"a": 1});
        assert!(subset_equals(&actual, &expected));
    }

    #[test]
    fn subset_equals_is_reflexive() {
        let v = json!({"a": [1, 2, {"c": 3}]});
        assert!(subset_equals(&v, &v));
    }

    #[test]
    fn subset_equals_requires_strict_array_equality() {
        let actual = json!({"a": [1, 2, 3]});
        let expected = json!({"a": [1, 2]});
        assert!(!subset_equals(&actual, &expected));
    }

    #[test]
    fn test_op_matches_reports_nothing_extra() {
        let doc = Document::new(json!({
            "stack": [
                {"stack": [], "entrypoint": [10, 20, {".": "add_two_top"}]},
                {"stack": [30.0]}
            ],
        }));
        test(&doc).unwrap();
        assert_eq!(doc.borrow().root()["stack"], json!([]));
    }

    #[test]
    fn test_op_mismatch_pushes_structured_error() {
        let doc = Document::new(json!({
            "stack": [
                {"stack": [], "entrypoint": [1, 2, {".": "add_two_top"}]},
                {"stack": [99.0]}
            ],
        }));
        test(&doc).unwrap();
        let stack = doc.borrow().root()["stack"].clone();
        assert_eq!(stack.as_array().unwrap().len(), 1);
        assert_eq!(stack[0]["error"], json!(true));
        assert_eq!(stack[0]["kind"], json!("TestMismatch"));
    }

    #[test]
    fn step_executes_one_instruction_and_advances_pc() {
        let doc = Document::new(json!({
            "stack": [{"stack": [], "entrypoint": [10, 20]}],
        }));
        step(&doc).unwrap();
        let pushed = doc.borrow().root()["stack"][0].clone();
        assert_eq!(pushed["stack"], json!([10]));
        assert_eq!(pushed["pc"], json!(1));
    }
}
