//! The undo log (spec §4.4): recording patches when `is_reversible` is set,
//! grouping multi-mutation operations into a single atomic entry, and
//! inverting the most recent entry on `undo`.

use serde_json::Value;

use crate::document::{is_reversible, DocHandle};
use crate::error::Error;
use crate::patch::{self, Patch};

/// Append one entry (a single patch, or — via [`Group`] — a patch group) to
/// `root["residual"]`, creating the array on first use. No-op when
/// `is_reversible` is not `true`.
fn push_entry(doc: &DocHandle, entry: Value) {
    let mut guard = crate::document::root_mut(doc);
    if !is_reversible(&guard) {
        return;
    }
    match guard.root_mut() {
        Value::Object(map) => {
            match map.get_mut("residual") {
                Some(Value::Array(arr)) => arr.push(entry),
                _ => {
                    map.insert("residual".to_string(), Value::Array(vec![entry]));
                }
            }
        }
        _ => {}
    }
}

/// Record a single-mutation patch, if reversibility is on.
pub fn record(doc: &DocHandle, patch: &Patch) {
    push_entry(doc, serde_json::to_value(patch).expect("Patch always serializes"));
}

/// Accumulates the patches of a multi-mutation operation and commits them
/// as one atomic residual entry (spec §4.4 "Grouping"). Dropping a `Group`
/// without calling [`Group::commit`] records nothing — half-built groups
/// are never observable.
pub struct Group {
    patches: Vec<Patch>,
}

impl Group {
    /// Start a new, empty group.
    pub fn new() -> Self {
        Group { patches: Vec::new() }
    }

    /// Accumulate one more patch into the group.
    pub fn push(&mut self, patch: Patch) {
        self.patches.push(patch);
    }

    /// Commit the group as a single `residual` entry, if reversibility is on
    /// and the group is non-empty. A group of exactly one patch is still
    /// committed as a one-element array, so `undo` can tell a genuine group
    /// apart from a lone patch purely by JSON shape (array vs object).
    pub fn commit(self, doc: &DocHandle) {
        if self.patches.is_empty() {
            return;
        }
        let entry = Value::Array(
            self.patches
                .iter()
                .map(|p| serde_json::to_value(p).expect("Patch always serializes"))
                .collect(),
        );
        push_entry(doc, entry);
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

/// Pop the last `residual` entry and invert it (spec §4.4 "Undo"): a single
/// patch is inverted once, a group is inverted patch-by-patch in reverse.
/// Returns `Ok(false)` when there is nothing to undo.
pub fn undo(doc: &DocHandle) -> Result<bool, Error> {
    let entry = {
        let mut guard = crate::document::root_mut(doc);
        let residual = match guard.root_mut() {
            Value::Object(map) => match map.get_mut("residual") {
                Some(Value::Array(arr)) => arr,
                _ => return Ok(false),
            },
            _ => return Err(Error::MissingRoot),
        };
        match residual.pop() {
            Some(entry) => entry,
            None => return Ok(false),
        }
    };

    match entry {
        Value::Array(entries) => {
            let patches: Vec<Patch> = entries
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<_, _>>()
                .map_err(|e| Error::Internal(format!("malformed residual group: {e}")))?;
            let mut guard = crate::document::root_mut(doc);
            for p in patches.iter().rev() {
                patch::invert(guard.root_mut(), p)?;
            }
        }
        single => {
            let p: Patch = serde_json::from_value(single)
                .map_err(|e| Error::Internal(format!("malformed residual entry: {e}")))?;
            let mut guard = crate::document::root_mut(doc);
            patch::invert(guard.root_mut(), &p)?;
        }
    }
    Ok(true)
}
