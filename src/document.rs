//! The document arena (spec §3).
//!
//! A `Document` wraps the JSON root object every operation mutates in place.
//! Per spec §9 ("Reference counting"), the retain count lives as a field of
//! the Rust struct rather than as a `root["ref"]` JSON key — `print_json`
//! and friends never have to filter bookkeeping out of their output, and the
//! count is still directly assertable by tests.
//!
//! Documents are always shared: a `Ptr` handle (see [`crate::pointer`]) holds
//! one clone of the `DocHandle` alongside the semantic retain count, and a
//! sub-interpreter (`test`/`step`/`undo`) clones the program it is given into
//! a brand new, independently ref-counted `Document`.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use serde_json::Value;

/// The mutable root a JISP program executes against.
#[derive(Debug)]
pub struct Document {
    root: Value,
    ref_count: i64,
}

/// A shared handle to a [`Document`]. Cloning a `DocHandle` is cheap (it is
/// an `Rc` clone); the semantic "one share of the document's lifetime" that
/// spec §3 describes is tracked separately by [`Document::retain`]/`release`
/// so that retain/release balance stays assertable independent of how many
/// `Rc` clones happen to be alive for implementation reasons.
pub type DocHandle = Rc<RefCell<Document>>;

impl Document {
    /// Wrap `root` (which should be a JSON object) as a fresh document with
    /// a zero ref count.
    pub fn new(root: Value) -> DocHandle {
        Rc::new(RefCell::new(Document { root, ref_count: 0 }))
    }

    /// Borrow the root value.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Mutably borrow the root value.
    pub fn root_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    /// Current retain count. Never negative.
    pub fn ref_count(&self) -> i64 {
        self.ref_count
    }

    /// Increment the retain count, creating it at 1 if this is the first
    /// retain. A negative count (should never happen, but spec mandates the
    /// clamp) is treated as zero first.
    pub fn retain(&mut self) {
        if self.ref_count < 0 {
            self.ref_count = 0;
        }
        self.ref_count += 1;
    }

    /// Decrement the retain count. Clamped at zero; going to zero is the
    /// "arena is freed" point in spec terms, though in Rust the actual
    /// memory is reclaimed whenever the last `Rc` clone drops.
    pub fn release(&mut self) {
        if self.ref_count > 0 {
            self.ref_count -= 1;
        }
    }
}

/// Borrow the root value of a shared document.
pub fn root(doc: &DocHandle) -> Ref<'_, Document> {
    doc.borrow()
}

/// Mutably borrow a shared document.
pub fn root_mut(doc: &DocHandle) -> RefMut<'_, Document> {
    doc.borrow_mut()
}

/// `root["stack"]` as a mutable array, or `Error::MissingStack`.
pub fn stack_mut(doc: &mut Document) -> Result<&mut Vec<Value>, crate::error::Error> {
    match doc.root_mut() {
        Value::Object(map) => match map.get_mut("stack") {
            Some(Value::Array(arr)) => Ok(arr),
            _ => Err(crate::error::Error::MissingStack),
        },
        _ => Err(crate::error::Error::MissingRoot),
    }
}

/// `root["stack"]` as a read-only array, or `Error::MissingStack`.
pub fn stack(doc: &Document) -> Result<&Vec<Value>, crate::error::Error> {
    match doc.root() {
        Value::Object(map) => match map.get("stack") {
            Some(Value::Array(arr)) => Ok(arr),
            _ => Err(crate::error::Error::MissingStack),
        },
        _ => Err(crate::error::Error::MissingRoot),
    }
}

/// Whether `root["is_reversible"]` is `true`. Absent or non-bool means false.
pub fn is_reversible(doc: &Document) -> bool {
    matches!(
        doc.root().get("is_reversible"),
        Some(Value::Bool(true))
    )
}
