//! The `jisp` binary: wires [`cli`] argv parsing, the streaming
//! [`reader::DocumentReader`], and [`interpreter::Interpreter`] together,
//! reporting any fatal error through [`error::report_fatal`] (spec §6
//! "CLI").

use std::fs::File;
use std::io::{self, Read};
use std::process::ExitCode;

use jisp::cli;
use jisp::document::Document;
use jisp::error::{self, Error};
use jisp::interpreter::Interpreter;
use jisp::reader::DocumentReader;

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match cli::parse(argv) {
        Ok(args) => args,
        Err(err) => {
            error::report_fatal(&err, None);
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err((err, last_doc)) => {
            error::report_fatal(&err, last_doc.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &cli::Args) -> Result<(), (Error, Option<serde_json::Value>)> {
    let mut reader = open_reader(args.file.as_deref()).map_err(|e| (e, None))?;

    loop {
        let value = reader.next_document().map_err(|e| (e, None))?;
        let Some(root) = value else {
            return Ok(());
        };

        let doc = Document::new(root);
        let mut interp = Interpreter::new();
        interp.set_output_flags(args.raw, args.compact);

        interp
            .process_entrypoint(&doc)
            .map_err(|e| (e, Some(doc.borrow().root().clone())))?;
    }
}

fn open_reader(file: Option<&str>) -> Result<DocumentReader, Error> {
    match file {
        None | Some("-") => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| Error::Io(e.to_string()))?;
            DocumentReader::new(&buf[..])
        }
        Some(path) => {
            let file = File::open(path).map_err(|e| Error::Io(format!("{path}: {e}")))?;
            DocumentReader::new(file)
        }
    }
}
