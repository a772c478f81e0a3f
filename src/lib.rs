//! JISP: a stack-based interpreter whose program, data, and undo log are
//! all JSON (spec §1).
//!
//! See `SPEC_FULL.md` in the repository root for the full shape of this
//! crate; [`interpreter::Interpreter`] is the entry point most callers want.

pub mod cli;
pub mod document;
pub mod error;
pub mod interpreter;
pub mod ops;
pub mod patch;
pub mod pointer;
pub mod reader;
pub mod registry;
pub mod residual;
