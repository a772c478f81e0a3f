//! Manual argv parsing (spec §6 "CLI"): one optional positional filename,
//! plus `-r`/`-c` short flags, combinable (`-rc`, `-cr`). This mirrors the
//! teacher crate's own `main.rs`, which never reached for `clap` either —
//! the whole surface is two booleans and an optional path.

use crate::error::Error;

/// Parsed command-line arguments.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    /// Input file, or `None` to read from standard input. `-` also means
    /// standard input.
    pub file: Option<String>,
    /// `-r`: print a string root unquoted.
    pub raw: bool,
    /// `-c`: compact (non-pretty) JSON output.
    pub compact: bool,
}

/// Parse `args` (typically `std::env::args().skip(1)`).
pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Args, Error> {
    let mut parsed = Args::default();
    for arg in args {
        if let Some(flags) = arg.strip_prefix('-') {
            if flags.is_empty() || flags == "-" {
                // bare "-" is the stdin sentinel, not a flag bundle
                parsed.file = None;
                continue;
            }
            if flags.chars().all(|c| c == 'r' || c == 'c') {
                for c in flags.chars() {
                    match c {
                        'r' => parsed.raw = true,
                        'c' => parsed.compact = true,
                        _ => unreachable!(),
                    }
                }
            } else {
                return Err(Error::InvalidArg(format!("unrecognized flag '-{flags}'")));
            }
        } else {
            if parsed.file.is_some() {
                return Err(Error::InvalidArg(format!(
                    "unexpected extra positional argument '{arg}'"
                )));
            }
            parsed.file = Some(arg);
        }
    }
    Ok(parsed)
}
