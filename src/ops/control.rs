//! Control flow (spec §4.6 "Control flow").

use serde_json::Value;

use crate::document::DocHandle;
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::residual;

use super::support;

/// `enter`: pops the top stack element. A string resolves to an array at
/// that path; an array is executed in place. Either way the target runs as
/// a nested entrypoint (spec §4.6 "Control flow").
pub fn enter(interp: &mut Interpreter, doc: &DocHandle) -> Result<(), Error> {
    let (top, pop_patch) = support::pop(doc)?;
    residual::record(doc, &pop_patch);
    match top {
        Value::String(path) => {
            let array = {
                let guard = crate::document::root(doc);
                match crate::pointer::resolve(guard.root(), &path)? {
                    Value::Array(a) => a.clone(),
                    other => {
                        return Err(Error::TypeMismatch(format!(
                            "enter target is not an array: {other:?}"
                        )))
                    }
                }
            };
            interp.process_ep_array(doc, &array, &path)
        }
        Value::Array(array) => interp.process_ep_array(doc, &array, "<enter>"),
        other => Err(Error::TypeMismatch(format!(
            "enter expects a string or array, got {other:?}"
        ))),
    }
}

/// `exit`: sets the transient `_interrupt_exit` flag. The enclosing
/// `process_ep_array` clears it and stops iterating on its next step —
/// unwinding exactly one frame (spec §4.6, §9 "Exit interrupt").
pub fn exit(doc: &DocHandle) -> Result<(), Error> {
    let mut guard = crate::document::root_mut(doc);
    match guard.root_mut() {
        Value::Object(map) => {
            map.insert("_interrupt_exit".to_string(), Value::Bool(true));
            Ok(())
        }
        _ => Err(Error::MissingRoot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    #[test]
    fn enter_executes_array_in_place() {
        let doc = Document::new(json!({"stack": [[1, 2]]}));
        let mut interp = Interpreter::new();
        enter(&mut interp, &doc).unwrap();
        assert_eq!(doc.borrow().root()["stack"], json!([1, 2]));
    }

    #[test]
    fn enter_resolves_named_array_by_path() {
        let doc = Document::new(json!({"stack": ["/helper"], "helper": [5]}));
        let mut interp = Interpreter::new();
        enter(&mut interp, &doc).unwrap();
        assert_eq!(doc.borrow().root()["stack"], json!([5]));
    }

    #[test]
    fn exit_sets_interrupt_flag() {
        let doc = Document::new(json!({"stack": []}));
        exit(&doc).unwrap();
        assert_eq!(doc.borrow().root()["_interrupt_exit"], json!(true));
    }
}
