//! The streaming multi-document reader and the permissive JSON parse shared
//! by the top-level CLI input and the `load` operation (spec §6
//! "Streaming", §4.6 "I/O").
//!
//! The source this was distilled from parses with `YYJSON_READ_ALLOW_COMMENTS`
//! (`jisp.c:631`); JISP gets the same comment/trailing-comma tolerance from
//! `jsonc-parser`'s serde bridge instead of hand-rolling a tolerant scanner.

use std::io::Read;

use jsonc_parser::ParseOptions;
use serde_json::Value;

use crate::error::Error;

/// Parse `text` as JSON, tolerating `//`/`/* */` comments and trailing
/// commas, the way `load` and the top-level CLI reader both need to (spec
/// §E "The parser used for the top-level document and for `load` allows
/// comments and trailing commas").
pub fn parse_tolerant(text: &str) -> Result<Value, Error> {
    jsonc_parser::parse_to_serde_value(text, &ParseOptions::default())
        .map_err(|e| Error::Parse {
            message: e.to_string(),
            offset: 0,
            line: 0,
            column: 0,
        })?
        .ok_or_else(|| Error::Parse {
            message: "empty document".to_string(),
            offset: 0,
            line: 0,
            column: 0,
        })
}

/// Read whitespace-delimited JSON values one at a time from `input` until
/// EOF, yielding each parsed root as it's found. Mirrors the C original's
/// incremental `yyjson` read loop: each document is read, then (by the
/// caller) executed to completion before the next is read.
pub struct DocumentReader {
    buf: String,
    pos: usize,
}

impl DocumentReader {
    /// Read all of `input` up front (documents are small JSON trees; this
    /// crate does not attempt incremental I/O below the whole-buffer level)
    /// and prepare to split it into top-level values.
    pub fn new<R: Read>(mut input: R) -> Result<Self, Error> {
        let mut buf = String::new();
        input
            .read_to_string(&mut buf)
            .map_err(|e| Error::Io(e.to_string()))?;
        Ok(DocumentReader { buf, pos: 0 })
    }

    /// Build a reader directly from an in-memory string (used by tests and
    /// by any caller that already has the input).
    pub fn from_str(text: &str) -> Self {
        DocumentReader {
            buf: text.to_string(),
            pos: 0,
        }
    }

    /// Parse and return the next top-level JSON value, skipping leading
    /// whitespace. Returns `Ok(None)` at a clean EOF (only whitespace, or
    /// nothing, remains).
    pub fn next_document(&mut self) -> Result<Option<Value>, Error> {
        self.skip_whitespace();
        if self.pos >= self.buf.len() {
            return Ok(None);
        }

        let start = self.pos;
        let end = self.scan_value_end(start)?;
        let slice = &self.buf[start..end];
        self.pos = end;

        let value = parse_tolerant(slice).map_err(|e| match e {
            Error::Parse { message, .. } => {
                let (line, column) = crate::error::locate_pos(&self.buf, start);
                Error::Parse {
                    message,
                    offset: start,
                    line,
                    column,
                }
            }
            other => other,
        })?;
        Ok(Some(value))
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.buf[self.pos..].chars().next() {
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    /// Scan forward from `start` to find the end of one top-level JSON
    /// value by tracking bracket/brace depth and string/escape state. This
    /// is a lexical scan only — `jsonc_parser` does the real parsing once
    /// the span is isolated.
    fn scan_value_end(&self, start: usize) -> Result<usize, Error> {
        let bytes = self.buf.as_bytes();
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escaped = false;
        let mut started = false;
        let mut i = start;
        while i < bytes.len() {
            let b = bytes[i];
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                    if depth == 0 && started {
                        return Ok(i + 1);
                    }
                }
                i += 1;
                continue;
            }
            match b {
                b'"' => {
                    in_string = true;
                    started = true;
                }
                b'{' | b'[' => {
                    depth += 1;
                    started = true;
                }
                b'}' | b']' => {
                    depth -= 1;
                    if depth == 0 && started {
                        return Ok(i + 1);
                    }
                }
                b if b.is_ascii_whitespace() || b == b',' => {
                    if depth == 0 && started {
                        return Ok(i);
                    }
                }
                _ => started = true,
            }
            i += 1;
        }
        if !started {
            let (line, column) = crate::error::locate_pos(&self.buf, start);
            return Err(Error::Parse {
                message: "unexpected end of input".to_string(),
                offset: start,
                line,
                column,
            });
        }
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tolerant_accepts_comments_and_trailing_commas() {
        let text = r#"{
            // a comment
            "a": 1,
            "b": [1, 2,],
        }"#;
        let value = parse_tolerant(text).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1, "b": [1, 2]}));
    }

    #[test]
    fn reader_splits_whitespace_separated_documents() {
        let mut reader = DocumentReader::from_str("  {\"a\":1}\n\n {\"b\":2}  ");
        assert_eq!(
            reader.next_document().unwrap(),
            Some(serde_json::json!({"a": 1}))
        );
        assert_eq!(
            reader.next_document().unwrap(),
            Some(serde_json::json!({"b": 2}))
        );
        assert_eq!(reader.next_document().unwrap(), None);
    }

    #[test]
    fn reader_tolerates_arbitrary_whitespace_between_values() {
        let mut reader = DocumentReader::from_str("\t\n  1  \n\t 2\n");
        assert_eq!(reader.next_document().unwrap(), Some(serde_json::json!(1)));
        assert_eq!(reader.next_document().unwrap(), Some(serde_json::json!(2)));
        assert_eq!(reader.next_document().unwrap(), None);
    }

    #[test]
    fn unterminated_value_is_fatal_with_position() {
        let mut reader = DocumentReader::from_str("  {\"a\": ");
        let err = reader.next_document().unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
