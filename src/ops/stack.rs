//! Stack primitives (spec §4.6 "Stack primitives").

use serde_json::Value;

use crate::document::DocHandle;
use crate::error::Error;
use crate::patch::Patch;
use crate::residual::{self, Group};

use super::support;

/// `pop_and_store`: pops `[value, key]` (key on top), stores `value` under
/// `key` on the root. Records `remove`(key), `remove`(value), then an
/// `add` or `replace` at `/<key>` depending on whether the key already
/// existed (spec §4.4, §4.6).
pub fn pop_and_store(doc: &DocHandle) -> Result<(), Error> {
    let (key_value, key_patch) = support::pop(doc)?;
    let key = match key_value {
        Value::String(s) => s,
        other => {
            return Err(Error::TypeMismatch(format!(
                "pop_and_store key must be a string, got {other:?}"
            )))
        }
    };
    let (value, value_patch) = support::pop(doc)?;

    let mut group = Group::new();
    group.push(key_patch);
    group.push(value_patch);

    let path = format!("/{key}");
    let existed = {
        let guard = crate::document::root(doc);
        match guard.root() {
            Value::Object(map) => map.contains_key(&key),
            _ => return Err(Error::MissingRoot),
        }
    };
    {
        let mut guard = crate::document::root_mut(doc);
        match guard.root_mut() {
            Value::Object(map) => {
                map.insert(key, value.clone());
            }
            _ => return Err(Error::MissingRoot),
        }
    }

    group.push(if existed {
        Patch::Replace { path, value }
    } else {
        Patch::Add { path, value }
    });
    group.commit(doc);
    Ok(())
}

/// `duplicate_top`: pushes a deep copy of the current stack top.
pub fn duplicate_top(doc: &DocHandle) -> Result<(), Error> {
    let top = {
        let guard = crate::document::root(doc);
        let stack = crate::document::stack(&guard)?;
        stack
            .last()
            .cloned()
            .ok_or_else(|| Error::StackUnderflow("duplicate_top on empty stack".to_string()))?
    };
    let patch = support::push(doc, top)?;
    residual::record(doc, &patch);
    Ok(())
}

/// `add_two_top`: pops two numeric operands and pushes their sum as a real
/// (spec §9: "standardize `add_two_top` → real").
pub fn add_two_top(doc: &DocHandle) -> Result<(), Error> {
    let (b, patch_b) = support::pop(doc)?;
    let (a, patch_a) = support::pop(doc)?;
    let a = a
        .as_f64()
        .ok_or_else(|| Error::TypeMismatch(format!("add_two_top operand is not numeric: {a:?}")))?;
    let b = b
        .as_f64()
        .ok_or_else(|| Error::TypeMismatch(format!("add_two_top operand is not numeric: {b:?}")))?;
    let sum = a + b;
    let value = serde_json::Number::from_f64(sum)
        .map(Value::Number)
        .ok_or_else(|| Error::Internal("add_two_top produced a non-finite sum".to_string()))?;

    let mut group = Group::new();
    group.push(patch_b);
    group.push(patch_a);
    let add_patch = support::push(doc, value)?;
    group.push(add_patch);
    group.commit(doc);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    #[test]
    fn pop_and_store_creates_new_key() {
        let doc = Document::new(json!({"stack": [42, "answer"], "is_reversible": true}));
        pop_and_store(&doc).unwrap();
        let root = doc.borrow().root().clone();
        assert_eq!(root["answer"], json!(42));
        assert_eq!(root["stack"], json!([]));
        assert_eq!(root["residual"].as_array().unwrap().len(), 1);
        assert!(root["residual"][0].is_array());
    }

    #[test]
    fn pop_and_store_rejects_non_string_key() {
        let doc = Document::new(json!({"stack": [42, 7]}));
        assert!(matches!(pop_and_store(&doc), Err(Error::TypeMismatch(_))));
    }

    #[test]
    fn duplicate_top_pushes_a_copy() {
        let doc = Document::new(json!({"stack": [1, 2]}));
        duplicate_top(&doc).unwrap();
        assert_eq!(doc.borrow().root()["stack"], json!([1, 2, 2]));
    }

    #[test]
    fn add_two_top_sums_as_real() {
        let doc = Document::new(json!({"stack": [10, 20]}));
        add_two_top(&doc).unwrap();
        assert_eq!(doc.borrow().root()["stack"], json!([30.0]));
    }

    #[test]
    fn add_two_top_underflows_on_short_stack() {
        let doc = Document::new(json!({"stack": [1]}));
        assert!(matches!(add_two_top(&doc), Err(Error::StackUnderflow(_))));
    }
}
