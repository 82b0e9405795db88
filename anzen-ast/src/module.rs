//! The top-level compilation unit and its processing state (§4.8).

use anzen_util::Span;

use crate::decl::Decl;
use crate::ids::ScopeId;

/// `parsed → symbolsExtracted → scopesBound → constraintsGenerated → typed → errored`.
/// Pass N refuses to run unless the module is at exactly state N−1 (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Parsed,
    SymbolsExtracted,
    ScopesBound,
    ConstraintsGenerated,
    Typed,
    Errored,
}

impl ModuleState {
    /// The state a pass numbered `pass` (1-indexed, matching §2's five
    /// passes) requires the module to be in before it may run.
    pub fn precedes(self, required: ModuleState) -> bool {
        self.rank() + 1 == required.rank()
    }

    fn rank(self) -> u8 {
        match self {
            ModuleState::Parsed => 0,
            ModuleState::SymbolsExtracted => 1,
            ModuleState::ScopesBound => 2,
            ModuleState::ConstraintsGenerated => 3,
            ModuleState::Typed => 4,
            ModuleState::Errored => 5,
        }
    }
}

/// A scope-opening node: the root of the AST, and of the scope tree whose
/// parent is the built-in scope (§4.2, §4.3).
#[derive(Debug, Clone)]
pub struct Module {
    pub decls: Vec<Decl>,
    pub span: Span,
    pub inner_scope: Option<ScopeId>,
    pub state: ModuleState,
}

impl Module {
    pub fn new(decls: Vec<Decl>, span: Span) -> Self {
        Module { decls, span, inner_scope: None, state: ModuleState::Parsed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_module_starts_parsed() {
        let m = Module::new(Vec::new(), Span::DUMMY);
        assert_eq!(m.state, ModuleState::Parsed);
    }

    #[test]
    fn precedes_only_holds_for_the_immediate_next_state() {
        assert!(ModuleState::Parsed.precedes(ModuleState::SymbolsExtracted));
        assert!(!ModuleState::Parsed.precedes(ModuleState::ScopesBound));
        assert!(!ModuleState::Typed.precedes(ModuleState::SymbolsExtracted));
    }
}
