//! The dispatcher/evaluator (spec §4.5 "Dispatcher", §9 "Exit interrupt",
//! "Pointer stack").
//!
//! `Interpreter` owns the two pieces of state that live outside the
//! document: the pointer-handle stack (spec §3 "Ownership") and the two
//! output-formatting flags `print_json` reads (spec §6 "CLI"). Everything
//! else — `stack`, `entrypoint`, `residual`, `call_stack`, `pc` — lives in
//! the `Document` being executed.

use serde_json::Value;

use crate::document::DocHandle;
use crate::error::Error;
use crate::ops;
use crate::pointer::Ptr;
use crate::registry::OpId;

/// Default capacity of the pointer-handle stack (spec §3 "Ownership": "a
/// fixed-capacity pointer stack (default capacity 64)").
pub const DEFAULT_PTR_STACK_CAPACITY: usize = 64;

/// Drives one document's `entrypoint` to completion, owning the
/// pointer-handle stack and the CLI output flags for the run.
pub struct Interpreter {
    ptr_stack: Vec<Ptr>,
    ptr_capacity: usize,
    raw_output: bool,
    compact_output: bool,
}

impl Interpreter {
    /// A new interpreter with the default pointer-stack capacity and both
    /// output flags off.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PTR_STACK_CAPACITY)
    }

    /// A new interpreter with an explicit pointer-stack capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Interpreter {
            ptr_stack: Vec::new(),
            ptr_capacity: capacity,
            raw_output: false,
            compact_output: false,
        }
    }

    /// Set the `-r`/`-c` output flags (spec §6 "CLI").
    pub fn set_output_flags(&mut self, raw: bool, compact: bool) {
        self.raw_output = raw;
        self.compact_output = compact;
    }

    pub fn raw_output(&self) -> bool {
        self.raw_output
    }

    pub fn compact_output(&self) -> bool {
        self.compact_output
    }

    pub(crate) fn ptr_stack_len(&self) -> usize {
        self.ptr_stack.len()
    }

    pub(crate) fn ptr_capacity(&self) -> usize {
        self.ptr_capacity
    }

    pub(crate) fn push_ptr(&mut self, ptr: Ptr) {
        self.ptr_stack.push(ptr);
    }

    pub(crate) fn pop_ptr(&mut self) -> Result<Ptr, Error> {
        self.ptr_stack.pop().ok_or(Error::HandleUnderflow)
    }

    pub(crate) fn peek_ptr(&self) -> Result<&Ptr, Error> {
        self.ptr_stack.last().ok_or(Error::HandleUnderflow)
    }

    /// Run `root["entrypoint"]` to completion (spec §4.5
    /// `process_entrypoint`).
    pub fn process_entrypoint(&mut self, doc: &DocHandle) -> Result<(), Error> {
        let entrypoint = {
            let guard = crate::document::root(doc);
            match guard.root().get("entrypoint") {
                Some(Value::Array(a)) => a.clone(),
                Some(_) => {
                    return Err(Error::InvalidArg(
                        "entrypoint is present but not an array".to_string(),
                    ))
                }
                None => Vec::new(),
            }
        };
        self.process_ep_array(doc, &entrypoint, "/")
    }

    /// Execute `array` as a nested entrypoint at `path`: push `path` onto
    /// `call_stack`, run each element, then pop `call_stack` — the depth is
    /// restored even if execution fails partway through (spec §8
    /// "`process_entrypoint` leaves `call_stack` at the same depth it
    /// found it").
    pub(crate) fn process_ep_array(
        &mut self,
        doc: &DocHandle,
        array: &[Value],
        path: &str,
    ) -> Result<(), Error> {
        push_call_stack(doc, path)?;
        let result = self.run_array(doc, array, path);
        pop_call_stack(doc)?;
        result
    }

    fn run_array(&mut self, doc: &DocHandle, array: &[Value], path: &str) -> Result<(), Error> {
        for (idx, elem) in array.iter().enumerate() {
            if interrupt_is_set(doc)? {
                clear_interrupt(doc)?;
                break;
            }
            self.step_element(doc, elem, path, idx)?;
        }
        Ok(())
    }

    /// Execute a single entrypoint element (spec §4.5 "Process-one-
    /// instruction", exposed here so `step` can drive one instruction at a
    /// time from an arbitrary index).
    pub(crate) fn step_element(
        &mut self,
        doc: &DocHandle,
        elem: &Value,
        path: &str,
        idx: usize,
    ) -> Result<(), Error> {
        match elem {
            Value::String(_) | Value::Number(_) | Value::Array(_) => {
                push_literal(doc, elem.clone())
            }
            Value::Object(map) => match map.get(".") {
                Some(Value::Array(nested)) => {
                    let nested = nested.clone();
                    let child_path = format!("{}/{}/.", path.trim_end_matches('/'), idx);
                    self.process_ep_array(doc, &nested, &child_path)
                }
                Some(Value::String(name)) => {
                    if let Some(op_id) = OpId::lookup(name) {
                        self.dispatch(doc, op_id)
                    } else {
                        let named_path = format!("/{name}");
                        let named_array = {
                            let guard = crate::document::root(doc);
                            match crate::pointer::resolve(guard.root(), &named_path) {
                                Ok(Value::Array(a)) => Some(a.clone()),
                                _ => None,
                            }
                        };
                        match named_array {
                            Some(arr) => self.process_ep_array(doc, &arr, &named_path),
                            None => push_literal(doc, elem.clone()),
                        }
                    }
                }
                _ => push_literal(doc, elem.clone()),
            },
            other => push_literal(doc, other.clone()),
        }
    }

    /// Execute exactly the instruction at `array[idx]`, used by the `step`
    /// sub-interpreter operation.
    pub(crate) fn step_instruction(
        &mut self,
        doc: &DocHandle,
        array: &[Value],
        path: &str,
        idx: usize,
    ) -> Result<(), Error> {
        self.step_element(doc, &array[idx], path, idx)
    }

    fn dispatch(&mut self, doc: &DocHandle, op: OpId) -> Result<(), Error> {
        match op {
            OpId::PopAndStore => ops::stack::pop_and_store(doc),
            OpId::DuplicateTop => ops::stack::duplicate_top(doc),
            OpId::AddTwoTop => ops::stack::add_two_top(doc),
            OpId::Get => ops::json::get(doc),
            OpId::Set => ops::json::set(doc),
            OpId::Append => ops::json::append(doc),
            OpId::MapOver => ops::higher_order::map_over(self, doc),
            OpId::PtrNew => ops::pointer_ops::ptr_new(self, doc),
            OpId::PtrRelease => ops::pointer_ops::ptr_release(self, doc),
            OpId::PtrGet => ops::pointer_ops::ptr_get(self, doc),
            OpId::PtrSet => ops::pointer_ops::ptr_set(self, doc),
            OpId::Enter => ops::control::enter(self, doc),
            OpId::Exit => ops::control::exit(doc),
            OpId::Test => ops::sub::test(doc),
            OpId::Step => ops::sub::step(doc),
            OpId::Undo => ops::sub::undo(doc),
            OpId::PrintJson => ops::io::print_json(self, doc),
            OpId::PrintError => ops::io::print_error(doc),
            OpId::Load => ops::io::load(doc),
            OpId::Store => ops::io::store(doc),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Push a deep copy of a literal entrypoint element onto `stack`, recording
/// `add /stack/-` (spec §4.4 "Push literal").
fn push_literal(doc: &DocHandle, value: Value) -> Result<(), Error> {
    let patch = ops_push(doc, value)?;
    crate::residual::record(doc, &patch);
    Ok(())
}

fn ops_push(doc: &DocHandle, value: Value) -> Result<crate::patch::Patch, Error> {
    let mut guard = crate::document::root_mut(doc);
    let stack = crate::document::stack_mut(&mut guard)?;
    stack.push(value.clone());
    Ok(crate::patch::Patch::Add {
        path: "/stack/-".to_string(),
        value,
    })
}

fn push_call_stack(doc: &DocHandle, path: &str) -> Result<(), Error> {
    let mut guard = crate::document::root_mut(doc);
    match guard.root_mut() {
        Value::Object(map) => {
            match map.get_mut("call_stack") {
                Some(Value::Array(arr)) => arr.push(Value::String(path.to_string())),
                _ => {
                    map.insert(
                        "call_stack".to_string(),
                        Value::Array(vec![Value::String(path.to_string())]),
                    );
                }
            }
            Ok(())
        }
        _ => Err(Error::MissingRoot),
    }
}

fn pop_call_stack(doc: &DocHandle) -> Result<(), Error> {
    let mut guard = crate::document::root_mut(doc);
    match guard.root_mut() {
        Value::Object(map) => {
            if let Some(Value::Array(arr)) = map.get_mut("call_stack") {
                arr.pop();
            }
            Ok(())
        }
        _ => Err(Error::MissingRoot),
    }
}

fn interrupt_is_set(doc: &DocHandle) -> Result<bool, Error> {
    let guard = crate::document::root(doc);
    match guard.root() {
        Value::Object(map) => Ok(matches!(map.get("_interrupt_exit"), Some(Value::Bool(true)))),
        _ => Err(Error::MissingRoot),
    }
}

fn clear_interrupt(doc: &DocHandle) -> Result<(), Error> {
    let mut guard = crate::document::root_mut(doc);
    match guard.root_mut() {
        Value::Object(map) => {
            map.remove("_interrupt_exit");
            Ok(())
        }
        _ => Err(Error::MissingRoot),
    }
}
