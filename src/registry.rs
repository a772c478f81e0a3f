//! The name → operation-id table (spec §4.5, §9 "Dispatch table keyed by
//! integer id").
//!
//! The source this was distilled from resolves an operation name by walking
//! a runtime JSON object every time a directive executes. Per spec §9 this
//! is replaced with a compile-time mapping from name to a tagged `OpId`;
//! [`crate::interpreter`] matches on the `OpId` to reach the actual function,
//! so adding an operation never costs a hash lookup at dispatch time.

/// One of the known operation names (spec §4.5 "The current set of names").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpId {
    PopAndStore,
    DuplicateTop,
    AddTwoTop,
    PrintJson,
    Undo,
    MapOver,
    Get,
    Set,
    Append,
    PtrNew,
    PtrRelease,
    PtrGet,
    PtrSet,
    Enter,
    Exit,
    Test,
    PrintError,
    Load,
    Store,
    Step,
}

impl OpId {
    /// Look up an operation by its directive name (the value of a `"."` key).
    /// Returns `None` for anything not in the registry — the caller (the
    /// dispatcher) falls back to resolving it as a named top-level array,
    /// then finally to pushing the directive object as a literal.
    pub fn lookup(name: &str) -> Option<OpId> {
        Some(match name {
            "pop_and_store" => OpId::PopAndStore,
            "duplicate_top" => OpId::DuplicateTop,
            "add_two_top" => OpId::AddTwoTop,
            "print_json" => OpId::PrintJson,
            "undo" => OpId::Undo,
            "map_over" => OpId::MapOver,
            "get" => OpId::Get,
            "set" => OpId::Set,
            "append" => OpId::Append,
            "ptr_new" => OpId::PtrNew,
            "ptr_release" => OpId::PtrRelease,
            "ptr_get" => OpId::PtrGet,
            "ptr_set" => OpId::PtrSet,
            "enter" => OpId::Enter,
            "exit" => OpId::Exit,
            "test" => OpId::Test,
            "print_error" => OpId::PrintError,
            "load" => OpId::Load,
            "store" => OpId::Store,
            "step" => OpId::Step,
            _ => return None,
        })
    }

    /// The canonical name this id was registered under, the inverse of
    /// [`OpId::lookup`]. Used by diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            OpId::PopAndStore => "pop_and_store",
            OpId::DuplicateTop => "duplicate_top",
            OpId::AddTwoTop => "add_two_top",
            OpId::PrintJson => "print_json",
            OpId::Undo => "undo",
            OpId::MapOver => "map_over",
            OpId::Get => "get",
            OpId::Set => "set",
            OpId::Append => "append",
            OpId::PtrNew => "ptr_new",
            OpId::PtrRelease => "ptr_release",
            OpId::PtrGet => "ptr_get",
            OpId::PtrSet => "ptr_set",
            OpId::Enter => "enter",
            OpId::Exit => "exit",
            OpId::Test => "test",
            OpId::PrintError => "print_error",
            OpId::Load => "load",
            OpId::Store => "store",
            OpId::Step => "step",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_round_trips_through_lookup() {
        let names = [
            "pop_and_store",
            "duplicate_top",
            "add_two_top",
            "print_json",
            "undo",
            "map_over",
            "get",
            "set",
            "append",
            "ptr_new",
            "ptr_release",
            "ptr_get",
            "ptr_set",
            "enter",
            "exit",
            "test",
            "print_error",
            "load",
            "store",
            "step",
        ];
        for n in names {
            let id = OpId::lookup(n).unwrap_or_else(|| panic!("missing op '{n}' in registry"));
            assert_eq!(id.name(), n);
        }
    }

    #[test]
    fn unknown_name_is_not_registered() {
        assert!(OpId::lookup("frobnicate").is_none());
    }
}
