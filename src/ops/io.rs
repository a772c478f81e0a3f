//! I/O primitives (spec §4.6 "I/O"). File access and stdout/stderr are the
//! "external boundary" spec §1 calls out as out of core scope; these
//! operations are the core's only window onto them.

use std::fs;

use serde_json::Value;

use crate::document::DocHandle;
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::reader;
use crate::residual::{self, Group};

use super::support;

/// `load`: pops a path string, parses the named file as JSON (tolerating
/// comments and trailing commas, like the top-level reader), and pushes a
/// deep copy of its root.
pub fn load(doc: &DocHandle) -> Result<(), Error> {
    let (path_value, path_patch) = support::pop(doc)?;
    let path = match path_value {
        Value::String(s) => s,
        other => {
            return Err(Error::TypeMismatch(format!(
                "load expects a path string, got {other:?}"
            )))
        }
    };
    let text = fs::read_to_string(&path).map_err(|e| Error::Io(format!("{path}: {e}")))?;
    let loaded = reader::parse_tolerant(&text)?;

    let mut group = Group::new();
    group.push(path_patch);
    let add_patch = support::push(doc, loaded)?;
    group.push(add_patch);
    group.commit(doc);
    Ok(())
}

/// `store`: pops `[value, path]` (path on top); writes `value` as
/// pretty-printed JSON to `path`. Per spec §9's open question about the
/// source writing both the whole document and the value to the same file,
/// this writes only the popped value.
pub fn store(doc: &DocHandle) -> Result<(), Error> {
    let (path_value, path_patch) = support::pop(doc)?;
    let path = match path_value {
        Value::String(s) => s,
        other => {
            return Err(Error::TypeMismatch(format!(
                "store expects a path string, got {other:?}"
            )))
        }
    };
    let (value, value_patch) = support::pop(doc)?;
    let text = serde_json::to_string_pretty(&value)
        .map_err(|e| Error::Internal(format!("store: failed to render JSON: {e}")))?;
    fs::write(&path, text).map_err(|e| Error::Io(format!("{path}: {e}")))?;

    let mut group = Group::new();
    group.push(path_patch);
    group.push(value_patch);
    group.commit(doc);
    Ok(())
}

/// `print_json`: writes the whole document to standard output, honoring the
/// `-r`/`-c` CLI flags (spec §4.6, §6 "CLI").
pub fn print_json(interp: &Interpreter, doc: &DocHandle) -> Result<(), Error> {
    let guard = crate::document::root(doc);
    let root = guard.root();
    if interp.raw_output() {
        if let Value::String(s) = root {
            println!("{s}");
            return Ok(());
        }
    }
    let text = if interp.compact_output() {
        serde_json::to_string(root)
    } else {
        serde_json::to_string_pretty(root)
    }
    .map_err(|e| Error::Internal(format!("print_json: failed to render JSON: {e}")))?;
    println!("{text}");
    Ok(())
}

/// `print_error`: pops one value and renders a structured error object
/// (spec §6) in a human-friendly form on standard error.
pub fn print_error(doc: &DocHandle) -> Result<(), Error> {
    let (value, pop_patch) = support::pop(doc)?;
    residual::record(doc, &pop_patch);

    match &value {
        Value::Object(map) if matches!(map.get("error"), Some(Value::Bool(true))) => {
            let kind = map.get("kind").and_then(Value::as_str).unwrap_or("Unknown");
            let message = map.get("message").and_then(Value::as_str).unwrap_or("");
            eprintln!("error: {kind}: {message}");
            if let Some(details) = map.get("details") {
                eprintln!("  details: {details}");
            }
        }
        other => eprintln!("error: {other}"),
    }
    Ok(())
}
