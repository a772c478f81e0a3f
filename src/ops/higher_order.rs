//! `map_over` (spec §4.6 "Higher-order").

use serde_json::Value;

use crate::document::DocHandle;
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::residual::Group;

use super::support;

/// Pops `[data, function]` (function on top; both arrays). For each element
/// of `data`, pushes a deep copy, executes `function` as a nested
/// entrypoint, and expects the stack to have grown by exactly one element;
/// that element is moved into a fresh result array. Fails with
/// `ArityMismatch` if any iteration's stack delta isn't +1.
pub fn map_over(interp: &mut Interpreter, doc: &DocHandle) -> Result<(), Error> {
    let (function_value, function_patch) = support::pop(doc)?;
    let function = match function_value {
        Value::Array(a) => a,
        other => {
            return Err(Error::TypeMismatch(format!(
                "map_over function must be an array, got {other:?}"
            )))
        }
    };
    let (data_value, data_patch) = support::pop(doc)?;
    let data = match data_value {
        Value::Array(a) => a,
        other => {
            return Err(Error::TypeMismatch(format!(
                "map_over data must be an array, got {other:?}"
            )))
        }
    };

    let mut results = Vec::with_capacity(data.len());
    for item in data {
        let before = support::stack_len(doc)?;
        support::push(doc, item)?;
        interp.process_ep_array(doc, &function, "<map_over>")?;
        let after = support::stack_len(doc)?;
        if after != before + 1 {
            return Err(Error::ArityMismatch(format!(
                "map_over function left {} elements on the stack, expected 1",
                after as i64 - before as i64
            )));
        }
        let (produced, _) = support::pop(doc)?;
        results.push(produced);
    }

    let mut group = Group::new();
    group.push(function_patch);
    group.push(data_patch);
    let add_patch = support::push(doc, Value::Array(results))?;
    group.push(add_patch);
    group.commit(doc);
    Ok(())
}
