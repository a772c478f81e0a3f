//! Black-box tests driving the public API the way `main.rs` does: parse CLI
//! args, stream documents through `DocumentReader`, run each to completion
//! with a fresh `Interpreter`. These exercise module boundaries the
//! `#[cfg(test)]` units inside each module don't — multi-document
//! streaming, the pointer-handle stack's lifetime across several ops, the
//! sub-interpreter's isolation from its parent, and the structured error
//! shape surfaced at the CLI boundary.

use jisp::cli;
use jisp::document::{Document, DocHandle};
use jisp::interpreter::Interpreter;
use jisp::reader::DocumentReader;
use serde_json::json;

fn run_document(root: serde_json::Value) -> DocHandle {
    let doc = Document::new(root);
    Interpreter::new().process_entrypoint(&doc).unwrap();
    doc
}

#[test]
fn streaming_runs_each_document_independently() {
    let mut reader = DocumentReader::from_str(
        r#"{"stack": [], "entrypoint": [1, 2, {".": "add_two_top"}]}
           {"stack": [], "entrypoint": ["x", "y"]}"#,
    );

    let first = reader.next_document().unwrap().unwrap();
    let doc1 = run_document(first);
    assert_eq!(doc1.borrow().root()["stack"], json!([3.0]));

    let second = reader.next_document().unwrap().unwrap();
    let doc2 = run_document(second);
    assert_eq!(doc2.borrow().root()["stack"], json!(["x", "y"]));

    assert_eq!(reader.next_document().unwrap(), None);
}

#[test]
fn streaming_tolerates_comments_within_a_document() {
    let mut reader = DocumentReader::from_str(
        "{\"stack\": [], /* trailing comma below */ \"entrypoint\": [1,]}\n{\"stack\": [], \"entrypoint\": [2]}",
    );
    let first = reader.next_document().unwrap().unwrap();
    assert_eq!(run_document(first).borrow().root()["stack"], json!([1]));
    let second = reader.next_document().unwrap().unwrap();
    assert_eq!(run_document(second).borrow().root()["stack"], json!([2]));
}

#[test]
fn cli_flags_reach_print_json_formatting() {
    let args = cli::parse(vec!["-c".to_string()]).unwrap();
    let doc = Document::new(json!({"stack": [], "entrypoint": [{"a": 1}, {".": "print_json"}]}));
    let mut interp = Interpreter::new();
    interp.set_output_flags(args.raw, args.compact);
    // print_json writes the whole document root, not the stack top; this
    // just confirms the op runs to completion with compact formatting wired
    // through from parsed CLI args without panicking.
    interp.process_entrypoint(&doc).unwrap();
    assert_eq!(doc.borrow().root()["stack"], json!([{"a": 1}]));
}

#[test]
fn pointer_stack_lifetime_across_new_get_set_release() {
    let doc_handle = run_document(json!({
        "stack": [],
        "target": {"value": 1},
        "entrypoint": [
            "/target",
            {".": "ptr_new"},
            {".": "ptr_get"},
            {".": "pop_and_store"},
            "copy",
            42,
            "/target/value",
            {".": "ptr_new"},
            {".": "ptr_set"},
            {".": "ptr_release"},
            {".": "ptr_release"}
        ],
    }));
    let root = doc_handle.borrow().root().clone();
    assert_eq!(root["copy"], json!({"value": 1}));
    assert_eq!(root["target"], json!({"value": 42}));
    assert_eq!(root["stack"], json!([]));
}

#[test]
fn sub_interpreter_test_reports_structural_mismatch() {
    let doc_handle = run_document(json!({
        "stack": [],
        "entrypoint": [
            {"stack": [], "entrypoint": [1, 2, {".": "add_two_top"}]},
            {"stack": [99.0]},
            {".": "test"}
        ],
    }));
    let stack = doc_handle.borrow().root()["stack"].clone();
    let results = stack.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["error"], json!(true));
}

#[test]
fn sub_interpreter_test_is_silent_on_match() {
    let doc_handle = run_document(json!({
        "stack": [],
        "entrypoint": [
            {"stack": [], "entrypoint": [1, 2, {".": "add_two_top"}]},
            {"stack": [3.0]},
            {".": "test"}
        ],
    }));
    assert_eq!(doc_handle.borrow().root()["stack"], json!([]));
}

#[test]
fn undo_restores_sub_document_stack_via_sub_interpreter_op() {
    let doc_handle = run_document(json!({
        "stack": [],
        "entrypoint": [
            {"stack": [1], "is_reversible": true, "residual": [{"op": "add", "path": "/stack/-", "value": 1}]},
            {".": "undo"}
        ],
    }));
    let results = doc_handle.borrow().root()["stack"].clone();
    let sub_docs = results.as_array().unwrap();
    assert_eq!(sub_docs.len(), 1);
    assert_eq!(sub_docs[0]["stack"], json!([]));
}

#[test]
fn unrecognized_cli_flag_is_rejected_before_any_document_runs() {
    let result = cli::parse(vec!["--help".to_string()]);
    assert!(result.is_err());
}

#[test]
fn stack_underflow_surfaces_as_an_error_not_a_panic() {
    let doc = Document::new(json!({"stack": [], "entrypoint": [{".": "pop_and_store"}]}));
    let err = Interpreter::new().process_entrypoint(&doc).unwrap_err();
    assert_eq!(err.kind(), "StackUnderflow");
}

#[test]
fn path_out_of_range_is_distinct_from_path_not_found() {
    let missing = Document::new(json!({
        "stack": [],
        "nums": [1, 2],
        "entrypoint": ["/does_not_exist", {".": "get"}],
    }));
    let err = Interpreter::new().process_entrypoint(&missing).unwrap_err();
    assert_eq!(err.kind(), "PathNotFound");

    let out_of_range = Document::new(json!({
        "stack": [],
        "nums": [1, 2],
        "entrypoint": ["/nums/5", {".": "get"}],
    }));
    let err = Interpreter::new()
        .process_entrypoint(&out_of_range)
        .unwrap_err();
    assert_eq!(err.kind(), "PathOutOfRange");
}
