//! RFC 6902-shaped patch operations over a `serde_json::Value` (spec §4.4
//! "Shape"). This is the teacher crate's own `add`/`remove`/`replace` core
//! (`json-patch`'s `lib.rs`), carried over almost verbatim and generalized
//! to operate on JISP paths (where `"/"` addresses the document root,
//! rather than RFC 6901's `""`) instead of being exposed as a whole-document
//! patch API. The residual/undo log in [`crate::residual`] is the only
//! consumer; JISP never patches an externally supplied `Patch` value.

use std::mem;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// A single RFC 6902 operation, restricted to the three kinds the residual
/// log ever records (spec §4.4: "`op` is one of `add`, `replace`, `remove`").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op")]
#[serde(rename_all = "lowercase")]
pub enum Patch {
    /// Add `value` at `path`. `path`'s last token may be `-` to append.
    Add {
        /// RFC 6901-ish path.
        path: String,
        /// Value to insert.
        value: Value,
    },
    /// Replace the value at `path` with `value`.
    Replace {
        /// RFC 6901-ish path.
        path: String,
        /// Replacement value.
        value: Value,
    },
    /// Remove the value at `path`.
    Remove {
        /// RFC 6901-ish path.
        path: String,
        /// The value that was there, captured for undo (spec §4.4 "Undo").
        /// Always populated by [`crate::residual`] when it records a
        /// removal; absent only for patches decoded from outside this
        /// crate (which JISP never does in practice).
        #[serde(skip_serializing_if = "Option::is_none", default)]
        value: Option<Value>,
    },
}

impl Patch {
    /// The path this patch addresses.
    pub fn path(&self) -> &str {
        match self {
            Patch::Add { path, .. } | Patch::Replace { path, .. } | Patch::Remove { path, .. } => {
                path
            }
        }
    }
}

fn split_pointer(pointer: &str) -> Result<(&str, String), Error> {
    pointer
        .rfind('/')
        .map(|idx| {
            (
                &pointer[..idx],
                pointer[idx + 1..].replace("~1", "/").replace("~0", "~"),
            )
        })
        .ok_or_else(|| Error::PathNotFound(pointer.to_string()))
}

fn parent_mut<'v>(doc: &'v mut Value, parent_path: &str) -> Result<&'v mut Value, Error> {
    if parent_path.is_empty() || parent_path == "/" {
        return Ok(doc);
    }
    crate::pointer::resolve_mut(doc, parent_path)
}

/// Apply a single `add`, writing `value` at `path`. Returns whatever value
/// used to occupy that spot, if any (object key overwrite).
pub fn apply_add(doc: &mut Value, path: &str, value: Value) -> Result<Option<Value>, Error> {
    if path == "/" {
        return Ok(Some(mem::replace(doc, value)));
    }
    let (parent_path, last) = split_pointer(path)?;
    let parent = parent_mut(doc, parent_path)?;
    match parent {
        Value::Object(map) => Ok(map.insert(last, value)),
        Value::Array(arr) if last == "-" => {
            arr.push(value);
            Ok(None)
        }
        Value::Array(arr) => {
            let idx: usize = last
                .parse()
                .map_err(|_| Error::PathNotFound(path.to_string()))?;
            if idx > arr.len() {
                return Err(Error::PathOutOfRange(path.to_string()));
            }
            arr.insert(idx, value);
            Ok(None)
        }
        _ => Err(Error::TypeMismatch(format!("cannot add at {path}"))),
    }
}

/// Apply a single `remove`, returning the removed value.
pub fn apply_remove(doc: &mut Value, path: &str) -> Result<Value, Error> {
    let (parent_path, last) = split_pointer(path)?;
    let parent = parent_mut(doc, parent_path)?;
    match parent {
        Value::Object(map) => map
            .remove(last.as_str())
            .ok_or_else(|| Error::PathNotFound(path.to_string())),
        Value::Array(arr) if last == "-" => arr
            .pop()
            .ok_or_else(|| Error::StackUnderflow(format!("remove '-' on empty array {path}"))),
        Value::Array(arr) => {
            let idx: usize = last
                .parse()
                .map_err(|_| Error::PathNotFound(path.to_string()))?;
            if idx >= arr.len() {
                return Err(Error::PathOutOfRange(path.to_string()));
            }
            Ok(arr.remove(idx))
        }
        _ => Err(Error::TypeMismatch(format!("cannot remove at {path}"))),
    }
}

/// Apply a single `replace`, returning the previous value.
pub fn apply_replace(doc: &mut Value, path: &str, value: Value) -> Result<Value, Error> {
    let target = crate::pointer::resolve_mut(doc, path)?;
    Ok(mem::replace(target, value))
}

/// Apply one patch in place.
pub fn apply(doc: &mut Value, patch: &Patch) -> Result<(), Error> {
    match patch {
        Patch::Add { path, value } => {
            apply_add(doc, path, value.clone())?;
        }
        Patch::Replace { path, value } => {
            apply_replace(doc, path, value.clone())?;
        }
        Patch::Remove { path, .. } => {
            apply_remove(doc, path)?;
        }
    }
    Ok(())
}

/// Invert one patch (spec §4.4 "Inversion rules") and apply the inverse.
/// Only stack-targeted `add`/`remove` entries have a defined inverse;
/// everything else (a `replace`, or an `add`/`remove` outside `/stack/...`,
/// e.g. the root-key mutation half of a `pop_and_store` group) is a
/// best-effort no-op, matching spec §4.4 exactly ("Unknown op/path →
/// best-effort no-op").
pub fn invert(doc: &mut Value, patch: &Patch) -> Result<(), Error> {
    match patch {
        Patch::Add { path, .. } if path.starts_with("/stack/") => {
            apply_remove(doc, "/stack/-")?;
        }
        Patch::Remove {
            path,
            value: Some(v),
        } if path.starts_with("/stack/") => {
            apply_add(doc, "/stack/-", v.clone())?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_to_root_replaces_whole_document() {
        let mut doc = json!({"a": 1});
        let prev = apply_add(&mut doc, "/", json!({"b": 2})).unwrap();
        assert_eq!(prev, Some(json!({"a": 1})));
        assert_eq!(doc, json!({"b": 2}));
    }

    #[test]
    fn add_append_to_array() {
        let mut doc = json!({"stack": [1, 2]});
        apply_add(&mut doc, "/stack/-", json!(3)).unwrap();
        assert_eq!(doc, json!({"stack": [1, 2, 3]}));
    }

    #[test]
    fn remove_then_invert_restores_stack_top() {
        let mut doc = json!({"stack": [1, 2, 3]});
        let removed = apply_remove(&mut doc, "/stack/2").unwrap();
        assert_eq!(removed, json!(3));
        assert_eq!(doc, json!({"stack": [1, 2]}));

        let patch = Patch::Remove {
            path: "/stack/2".to_string(),
            value: Some(removed),
        };
        invert(&mut doc, &patch).unwrap();
        assert_eq!(doc, json!({"stack": [1, 2, 3]}));
    }

    #[test]
    fn invert_add_stack_push_pops_it() {
        let mut doc = json!({"stack": [1]});
        apply_add(&mut doc, "/stack/-", json!(2)).unwrap();
        assert_eq!(doc, json!({"stack": [1, 2]}));

        let patch = Patch::Add {
            path: "/stack/-".to_string(),
            value: json!(2),
        };
        invert(&mut doc, &patch).unwrap();
        assert_eq!(doc, json!({"stack": [1]}));
    }
}
