//! RFC 6901-flavored path resolution (spec §4.1) and the `Ptr` handle
//! (spec §4.2).
//!
//! JISP's one deliberate divergence from strict RFC 6901: the path `"/"`
//! denotes the root object itself, not the empty-string key. Everywhere
//! else, a path is a sequence of `/`-separated tokens with the usual
//! `~1` → `/`, `~0` → `~` escapes (decoded in that order, same as the
//! teacher crate's own `split_pointer`).

use serde_json::Value;

use crate::document::{root_mut, DocHandle};
use crate::error::Error;

/// Decode a single path token's `~1`/`~0` escapes.
fn decode_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Split `"/user/profile/age"` into `["user", "profile", "age"]`. The root
/// path `"/"` must be handled by the caller before calling this.
fn tokens(path: &str) -> Result<Vec<String>, Error> {
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| Error::PathNotFound(path.to_string()))?;
    if rest.is_empty() {
        // "/" is handled by the caller; an empty remainder here means the
        // path was literally "/" but got past that check, or malformed input.
        return Ok(Vec::new());
    }
    Ok(rest.split('/').map(decode_token).collect())
}

/// Parse a decoded token as a non-negative decimal array index, rejecting
/// leading zeroes (RFC 6901), the same discipline as the teacher's
/// `parse_index`.
fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() {
        return None;
    }
    if token.starts_with('0') && token.len() != 1 {
        return None;
    }
    token.parse::<usize>().ok()
}

/// Resolve `path` against `value`, returning a reference to the located
/// value. Used by operations that only need to read or replace a scalar,
/// and don't need a long-lived handle (spec §5 "borrowing resolver").
pub fn resolve<'v>(value: &'v Value, path: &str) -> Result<&'v Value, Error> {
    if path.is_empty() {
        return Err(Error::InvalidArg("empty path".to_string()));
    }
    if path == "/" {
        return Ok(value);
    }
    let toks = tokens(path)?;
    let mut cur = value;
    for tok in &toks {
        cur = step(cur, tok)?;
    }
    Ok(cur)
}

/// Resolve `path` against `value` for mutation.
pub fn resolve_mut<'v>(value: &'v mut Value, path: &str) -> Result<&'v mut Value, Error> {
    if path.is_empty() {
        return Err(Error::InvalidArg("empty path".to_string()));
    }
    if path == "/" {
        return Ok(value);
    }
    let toks = tokens(path)?;
    let mut cur = value;
    for tok in &toks {
        cur = step_mut(cur, tok)?;
    }
    Ok(cur)
}

fn step<'v>(cur: &'v Value, tok: &str) -> Result<&'v Value, Error> {
    match cur {
        Value::Object(map) => map
            .get(tok)
            .ok_or_else(|| Error::PathNotFound(tok.to_string())),
        Value::Array(arr) => {
            let idx = parse_index(tok).ok_or_else(|| Error::PathNotFound(tok.to_string()))?;
            if idx >= arr.len() {
                return Err(Error::PathOutOfRange(format!(
                    "index {idx} >= length {}",
                    arr.len()
                )));
            }
            Ok(&arr[idx])
        }
        _ => Err(Error::TypeMismatch(format!(
            "cannot traverse into {cur:?} at token '{tok}'"
        ))),
    }
}

fn step_mut<'v>(cur: &'v mut Value, tok: &str) -> Result<&'v mut Value, Error> {
    match cur {
        Value::Object(map) => map
            .get_mut(tok)
            .ok_or_else(|| Error::PathNotFound(tok.to_string())),
        Value::Array(arr) => {
            let idx = parse_index(tok).ok_or_else(|| Error::PathNotFound(tok.to_string()))?;
            let len = arr.len();
            if idx >= len {
                return Err(Error::PathOutOfRange(format!("index {idx} >= length {len}")));
            }
            Ok(&mut arr[idx])
        }
        other => Err(Error::TypeMismatch(format!(
            "cannot traverse into {other:?} at token '{tok}'"
        ))),
    }
}

/// A `{document, value, path}` triple (spec §4.2). Conceptually borrows
/// `value` from `document` and holds one share of the document's lifetime,
/// retained on successful [`ptr_resolve`] and released by [`ptr_release`].
pub struct Ptr {
    doc: DocHandle,
    path: String,
}

/// Resolve `path` against `doc`'s root and retain the document. This is the
/// only resolver that retains; `get`/`set`/`append` use [`resolve`]/
/// [`resolve_mut`] directly and never touch the ref count (spec §5).
pub fn ptr_resolve(doc: &DocHandle, path: &str) -> Result<Ptr, Error> {
    {
        let guard = doc.borrow();
        resolve(guard.root(), path)?;
    }
    root_mut(doc).retain();
    Ok(Ptr {
        doc: doc.clone(),
        path: path.to_string(),
    })
}

/// Release a handle, decrementing the document's ref count.
pub fn ptr_release(ptr: Ptr) {
    root_mut(&ptr.doc).release();
}

impl Ptr {
    /// The path this handle was resolved with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the handle's path still resolves in its document. Best
    /// effort only, per spec §3 ("the spec does not require
    /// dangling-detection beyond best-effort null-checks at use").
    pub fn is_valid(&self) -> bool {
        resolve(self.doc.borrow().root(), &self.path).is_ok()
    }

    /// A deep copy of the value the handle currently points at.
    pub fn value(&self) -> Result<Value, Error> {
        resolve(self.doc.borrow().root(), &self.path).cloned()
    }

    /// Assign a scalar value in place at the handle's target. Non-scalar
    /// assignment is unsupported (spec §9 "`ptr_set` on containers").
    pub fn set(&self, value: Value) -> Result<(), Error> {
        if !value.is_null() && !value.is_boolean() && !value.is_number() && !value.is_string() {
            return Err(Error::TypeMismatch(
                "ptr_set only supports scalar values".to_string(),
            ));
        }
        let mut guard = root_mut(&self.doc);
        let target = resolve_mut(guard.root_mut(), &self.path)?;
        *target = value;
        Ok(())
    }

    /// The document this handle belongs to.
    pub fn doc(&self) -> &DocHandle {
        &self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    fn doc() -> DocHandle {
        Document::new(json!({
            "stack": [],
            "user": {"profile": {"age": 42, "x~1y": 1, "x~0y": 2}},
            "nums": [7, 8, 9],
        }))
    }

    #[test]
    fn root_path_returns_whole_document() {
        let d = doc();
        let v = resolve(d.borrow().root(), "/").unwrap();
        assert!(v.is_object());
    }

    #[test]
    fn nested_object_and_array_lookup() {
        let d = doc();
        let guard = d.borrow();
        assert_eq!(resolve(guard.root(), "/user/profile/age").unwrap(), &json!(42));
        assert_eq!(resolve(guard.root(), "/nums/2").unwrap(), &json!(9));
    }

    #[test]
    fn tilde_and_slash_escapes_decode_in_order() {
        let d = doc();
        let guard = d.borrow();
        assert_eq!(resolve(guard.root(), "/user/profile/x~1y").unwrap(), &json!(1));
        assert_eq!(resolve(guard.root(), "/user/profile/x~0y").unwrap(), &json!(2));
    }

    #[test]
    fn malformed_escape_is_not_found() {
        let d = doc();
        let guard = d.borrow();
        assert!(matches!(
            resolve(guard.root(), "/user/profile/x~2y"),
            Err(Error::PathNotFound(_))
        ));
    }

    #[test]
    fn out_of_range_index_is_path_out_of_range() {
        let d = doc();
        let guard = d.borrow();
        assert!(matches!(
            resolve(guard.root(), "/nums/99"),
            Err(Error::PathOutOfRange(_))
        ));
    }

    #[test]
    fn traversing_into_a_scalar_is_type_mismatch() {
        let d = doc();
        let guard = d.borrow();
        assert!(matches!(
            resolve(guard.root(), "/user/profile/age/0"),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[test]
    fn resolve_retains_and_release_decrements_exactly_once() {
        let d = doc();
        assert_eq!(d.borrow().ref_count(), 0);
        let ptr = ptr_resolve(&d, "/nums").unwrap();
        assert_eq!(d.borrow().ref_count(), 1);
        ptr_release(ptr);
        assert_eq!(d.borrow().ref_count(), 0);
    }

    #[test]
    fn failed_resolve_does_not_change_ref_count() {
        let d = doc();
        assert!(ptr_resolve(&d, "/nope").is_err());
        assert_eq!(d.borrow().ref_count(), 0);
    }
}
