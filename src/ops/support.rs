//! Shared stack-mutation helpers used by every operation module. Each helper
//! performs the mutation and hands back the `Patch` describing it; callers
//! decide whether to record it directly (a single-mutation operation) or
//! accumulate it into a [`crate::residual::Group`] (a multi-mutation one) —
//! spec §4.4's recording table is explicitly "abbreviated", so the same
//! push-is-add / pop-is-remove bookkeeping applies uniformly to every
//! operation that touches `stack`, not just the ones the table names.

use serde_json::Value;

use crate::document::{root_mut, stack_mut, DocHandle};
use crate::error::Error;
use crate::patch::Patch;

/// Current length of `root["stack"]`.
pub fn stack_len(doc: &DocHandle) -> Result<usize, Error> {
    let guard = crate::document::root(doc);
    Ok(crate::document::stack(&guard)?.len())
}

/// Push `value` onto the stack, returning the `add /stack/-` patch.
pub fn push(doc: &DocHandle, value: Value) -> Result<Patch, Error> {
    let mut guard = root_mut(doc);
    let stack = stack_mut(&mut guard)?;
    stack.push(value.clone());
    Ok(Patch::Add {
        path: "/stack/-".to_string(),
        value,
    })
}

/// Pop the stack top, returning it along with the `remove /stack/<n>` patch
/// that captures it for undo.
pub fn pop(doc: &DocHandle) -> Result<(Value, Patch), Error> {
    let mut guard = root_mut(doc);
    let stack = stack_mut(&mut guard)?;
    let idx = stack
        .len()
        .checked_sub(1)
        .ok_or_else(|| Error::StackUnderflow("stack is empty".to_string()))?;
    let value = stack.remove(idx);
    let patch = Patch::Remove {
        path: format!("/stack/{idx}"),
        value: Some(value.clone()),
    };
    Ok((value, patch))
}
