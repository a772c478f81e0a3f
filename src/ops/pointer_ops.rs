//! Pointer-handle primitives (spec §4.6 "Pointer primitives"). These operate
//! on the interpreter's own fixed-capacity pointer-handle stack, not the
//! document's `stack` array — see spec §5 "Handles".

use serde_json::Value;

use crate::document::DocHandle;
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::pointer;
use crate::residual;

use super::support;

/// `ptr_new`: pops a path string from the document stack, resolves it, and
/// pushes the handle onto the pointer-handle stack. Fails with
/// `HandleOverflow` if the pointer stack is already at capacity.
pub fn ptr_new(interp: &mut Interpreter, doc: &DocHandle) -> Result<(), Error> {
    if interp.ptr_stack_len() >= interp.ptr_capacity() {
        return Err(Error::HandleOverflow(interp.ptr_capacity()));
    }
    let (path_value, pop_patch) = support::pop(doc)?;
    let path = match path_value {
        Value::String(s) => s,
        other => {
            return Err(Error::TypeMismatch(format!(
                "ptr_new expects a path string, got {other:?}"
            )))
        }
    };
    let handle = pointer::ptr_resolve(doc, &path)?;
    residual::record(doc, &pop_patch);
    interp.push_ptr(handle);
    Ok(())
}

/// `ptr_release`: pops the top pointer handle and releases it.
pub fn ptr_release(interp: &mut Interpreter, _doc: &DocHandle) -> Result<(), Error> {
    let handle = interp.pop_ptr()?;
    pointer::ptr_release(handle);
    Ok(())
}

/// `ptr_get`: peeks the top pointer handle, pushes a deep copy of its value.
pub fn ptr_get(interp: &mut Interpreter, doc: &DocHandle) -> Result<(), Error> {
    let value = interp.peek_ptr()?.value()?;
    let patch = support::push(doc, value)?;
    residual::record(doc, &patch);
    Ok(())
}

/// `ptr_set`: peeks the top pointer handle, pops a scalar value from the
/// document stack, and assigns it in place to the pointer's target.
pub fn ptr_set(interp: &mut Interpreter, doc: &DocHandle) -> Result<(), Error> {
    let (value, pop_patch) = support::pop(doc)?;
    interp.peek_ptr()?.set(value)?;
    residual::record(doc, &pop_patch);
    Ok(())
}
