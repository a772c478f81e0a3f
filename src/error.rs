//! The typed failure taxonomy (spec §7) and the fatal diagnostic banner.
//!
//! Every operation in [`crate::ops`] returns `Result<_, Error>`. An `Error`
//! that escapes the outer interpreter is fatal: [`report_fatal`] prints a
//! banner, a best-effort snapshot of the document and a backtrace, then the
//! caller exits the process. The sub-interpreter driver (`test`) is the only
//! place an `Error` is caught instead of propagated; see [`crate::ops::sub`].

use std::backtrace::Backtrace;

use serde_json::Value;

/// Every way a JISP document can fail to execute.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Null or otherwise nonsensical argument to an operation.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The document has no root object.
    #[error("document has no root")]
    MissingRoot,

    /// `root["stack"]` is absent or not an array.
    #[error("document has no array 'stack'")]
    MissingStack,

    /// An operation needed more elements than the stack had.
    #[error("stack underflow: {0}")]
    StackUnderflow(String),

    /// An operand's JSON type is not supported by the operation.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// An RFC 6901-ish path did not resolve to a value.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// A numeric path segment named an index at or beyond a sequence's length.
    #[error("path index out of range: {0}")]
    PathOutOfRange(String),

    /// `map_over`'s function did not leave exactly one extra value on the stack.
    #[error("arity mismatch: {0}")]
    ArityMismatch(String),

    /// File open/read/write failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON parsing failure, with a byte offset and a derived line/column.
    #[error("parse error at byte {offset} (line {line}, column {column}): {message}")]
    Parse {
        /// Human-readable message from the underlying parser.
        message: String,
        /// Zero-based byte offset into the source text.
        offset: usize,
        /// One-based source line.
        line: usize,
        /// One-based source column.
        column: usize,
    },

    /// `ptr_new` on a full pointer-handle stack.
    #[error("pointer-handle stack overflow (capacity {0})")]
    HandleOverflow(usize),

    /// A pointer operation on an empty pointer-handle stack.
    #[error("pointer-handle stack underflow")]
    HandleUnderflow,

    /// Allocation failure or broken invariant.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The bare symbolic name of this error's kind, used as the `kind` field
    /// of the structured error object (spec §6) and in the fatal banner.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidArg(_) => "InvalidArg",
            Error::MissingRoot => "MissingRoot",
            Error::MissingStack => "MissingStack",
            Error::StackUnderflow(_) => "StackUnderflow",
            Error::TypeMismatch(_) => "TypeMismatch",
            Error::PathNotFound(_) => "PathNotFound",
            Error::PathOutOfRange(_) => "PathOutOfRange",
            Error::ArityMismatch(_) => "ArityMismatch",
            Error::Io(_) => "IO",
            Error::Parse { .. } => "Parse",
            Error::HandleOverflow(_) => "HandleOverflow",
            Error::HandleUnderflow => "HandleUnderflow",
            Error::Internal(_) => "Internal",
        }
    }

    /// Source position, if this is a [`Error::Parse`].
    pub fn position(&self) -> Option<(usize, usize, usize)> {
        match *self {
            Error::Parse {
                offset,
                line,
                column,
                ..
            } => Some((offset, line, column)),
            _ => None,
        }
    }
}

/// Locate the 1-based (line, column) of a byte offset within `src`, the way
/// `jisp_report_pos` in the original C source does.
pub fn locate_pos(src: &str, pos: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for ch in src[..pos.min(src.len())].chars() {
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Print the fatal-error banner to stderr: kind, message, source position
/// (for parse errors), a best-effort backtrace, and a pretty-printed
/// snapshot of the document. Mirrors `jisp_fatal`/`jisp_fatal_parse`/
/// `jisp_dump_state` in the original source.
pub fn report_fatal(err: &Error, doc: Option<&Value>) {
    eprintln!("JISP fatal error: {} ({})", err, err.kind());
    if let Some((offset, line, column)) = err.position() {
        eprintln!("  at byte {offset} (line {line}, column {column})");
    }

    let bt = Backtrace::capture();
    eprintln!("---- backtrace (best effort) ----");
    eprintln!("{bt}");
    eprintln!("----------------------------------");

    if let Some(doc) = doc {
        match serde_json::to_string_pretty(doc) {
            Ok(s) => eprintln!("\n---- JSON state snapshot ----\n{s}\n------------------------------"),
            Err(e) => eprintln!("(failed to render document snapshot: {e})"),
        }
    }
}

