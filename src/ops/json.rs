//! JSON primitives (spec §4.6 "JSON primitives").

use serde_json::Value;

use crate::document::DocHandle;
use crate::error::Error;
use crate::patch::{self, Patch};
use crate::residual::Group;

use super::support;

fn expect_path(value: Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(Error::TypeMismatch(format!(
            "expected a path string, got {other:?}"
        ))),
    }
}

fn is_scalar(value: &Value) -> bool {
    value.is_null() || value.is_boolean() || value.is_number() || value.is_string()
}

/// `get`: pops a path string, pushes a deep copy of the resolved value.
pub fn get(doc: &DocHandle) -> Result<(), Error> {
    let (path_value, path_patch) = support::pop(doc)?;
    let path = expect_path(path_value)?;

    let resolved = {
        let guard = crate::document::root(doc);
        crate::pointer::resolve(guard.root(), &path)?.clone()
    };

    let mut group = Group::new();
    group.push(path_patch);
    let add_patch = support::push(doc, resolved)?;
    group.push(add_patch);
    group.commit(doc);
    Ok(())
}

/// `set`: pops `[value, path]` (path on top); writes the scalar `value` in
/// place at `path`. Non-scalar targets fail with `TypeMismatch`.
pub fn set(doc: &DocHandle) -> Result<(), Error> {
    let (path_value, path_patch) = support::pop(doc)?;
    let path = expect_path(path_value)?;
    let (value, value_patch) = support::pop(doc)?;
    if !is_scalar(&value) {
        return Err(Error::TypeMismatch(
            "set only supports scalar values".to_string(),
        ));
    }

    let mut group = Group::new();
    group.push(path_patch);
    group.push(value_patch);

    {
        let mut guard = crate::document::root_mut(doc);
        patch::apply_replace(guard.root_mut(), &path, value.clone())?;
    }
    group.push(Patch::Replace { path, value });
    group.commit(doc);
    Ok(())
}

/// `append`: pops `[value, path]` (path on top); `path` must resolve to an
/// ordered sequence, to which a deep copy of `value` is appended.
pub fn append(doc: &DocHandle) -> Result<(), Error> {
    let (path_value, path_patch) = support::pop(doc)?;
    let path = expect_path(path_value)?;
    let (value, value_patch) = support::pop(doc)?;

    {
        let guard = crate::document::root(doc);
        match crate::pointer::resolve(guard.root(), &path)? {
            Value::Array(_) => {}
            other => {
                return Err(Error::TypeMismatch(format!(
                    "append target is not an array: {other:?}"
                )))
            }
        }
    }

    let append_path = if path == "/" {
        "/-".to_string()
    } else {
        format!("{path}/-")
    };
    {
        let mut guard = crate::document::root_mut(doc);
        patch::apply_add(guard.root_mut(), &append_path, value.clone())?;
    }

    let mut group = Group::new();
    group.push(path_patch);
    group.push(value_patch);
    group.push(Patch::Add {
        path: append_path,
        value,
    });
    group.commit(doc);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    #[test]
    fn get_pushes_a_copy_of_the_resolved_value() {
        let doc = Document::new(json!({"stack": ["/nums"], "nums": [1, 2]}));
        get(&doc).unwrap();
        assert_eq!(doc.borrow().root()["stack"], json!([[1, 2]]));
    }

    #[test]
    fn get_on_missing_path_fails_not_found() {
        let doc = Document::new(json!({"stack": ["/missing"]}));
        assert!(matches!(get(&doc), Err(Error::PathNotFound(_))));
    }

    #[test]
    fn set_writes_scalar_in_place() {
        let doc = Document::new(json!({"stack": [99, "/age"], "age": 1}));
        set(&doc).unwrap();
        assert_eq!(doc.borrow().root()["age"], json!(99));
        assert_eq!(doc.borrow().root()["stack"], json!([]));
    }

    #[test]
    fn set_rejects_non_scalar_value() {
        let doc = Document::new(json!({"stack": [[1, 2], "/age"], "age": 1}));
        assert!(matches!(set(&doc), Err(Error::TypeMismatch(_))));
    }

    #[test]
    fn append_round_trips_with_get() {
        let doc = Document::new(json!({"stack": [3, "/nums"], "nums": [1, 2]}));
        append(&doc).unwrap();
        assert_eq!(doc.borrow().root()["nums"], json!([1, 2, 3]));
        {
            let mut guard = crate::document::root_mut(&doc);
            guard
                .root_mut()
                .as_object_mut()
                .unwrap()
                .get_mut("stack")
                .unwrap()
                .as_array_mut()
                .unwrap()
                .push(json!("/nums"));
        }
        get(&doc).unwrap();
        assert_eq!(doc.borrow().root()["stack"], json!([[1, 2, 3]]));
    }
}
