//! Anzen's semantic analyzer and type-inference engine (§1, §5).
//!
//! A strict 5-pass pipeline over an [`anzen_ast::Module`]: symbol
//! extraction, scope binding, constraint generation, constraint solving,
//! and type assignment. Each pass is its own module and owns exactly the
//! `ModuleState` transition it's responsible for (§4.8); [`run`] is the only
//! place that sequences them.

pub mod assign;
pub mod bind;
pub mod builtin_contract;
pub mod constrain;
pub mod diagnostics;
pub mod extract;
pub mod mangle;
pub mod qualifier_ty;
pub mod scope;
pub mod solve;
pub mod types;

use anzen_ast::{Module, ScopeId};
use anzen_util::Handler;

use crate::assign::TypeAssigner;
use crate::bind::ScopeBinder;
use crate::builtin_contract::BuiltinIds;
use crate::constrain::ConstraintGenerator;
use crate::diagnostics::AnzenError;
use crate::extract::SymbolExtractor;
use crate::scope::{ScopeTree, SymbolTable};
use crate::solve::SolverConfig;
use crate::types::TypeContext;

/// Everything a completed analysis leaves behind: the scope/symbol/type
/// arenas every `anzen_ast::*Id` on the module's nodes now indexes into,
/// plus whatever diagnostics accumulated (§7). The module's own `state`
/// field (§4.8) tells the caller whether it's safe to proceed to codegen.
pub struct AnalysisResult {
    pub scopes: ScopeTree,
    pub symbols: SymbolTable,
    pub types: TypeContext,
    pub handler: Handler<AnzenError>,
}

/// Runs the full pipeline over `module`, wiring it to `builtin_scope`
/// (§4.2) — supplied externally, typically by `anzen_builtins::populate`,
/// never constructed by this crate itself (§6). Uses [`SolverConfig::default`];
/// see [`run_with_config`] to override pass 4's fairness cap.
pub fn run(module: &mut Module, builtin_scope: ScopeId, builtins: &BuiltinIds, scopes: ScopeTree, symbols: SymbolTable, types: TypeContext) -> AnalysisResult {
    run_with_config(module, builtin_scope, builtins, scopes, symbols, types, SolverConfig::default())
}

/// As [`run`], but lets the embedding driver supply its own [`SolverConfig`]
/// (§10 "no environment-variable or file-based config parsing belongs in
/// the core itself" — the driver builds the struct, the core just consumes it).
pub fn run_with_config(
    module: &mut Module,
    builtin_scope: ScopeId,
    builtins: &BuiltinIds,
    mut scopes: ScopeTree,
    mut symbols: SymbolTable,
    mut types: TypeContext,
    solver_config: SolverConfig,
) -> AnalysisResult {
    let mut handler = Handler::new();

    SymbolExtractor::new(&mut scopes, &mut symbols, &mut types, &mut handler).run(module, Some(builtin_scope));
    ScopeBinder::new(&scopes, &mut handler).run(module);
    let constraints = ConstraintGenerator::new(&scopes, &symbols, &mut types, builtins, &mut handler).run(module);
    solve::Solver::with_config(&mut types, &mut handler, solver_config).run(constraints);
    TypeAssigner::new(&mut types, &mut handler).run(module);

    AnalysisResult { scopes, symbols, types, handler }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anzen_ast::builder::*;
    use anzen_ast::{Decl, ModuleState};

    #[test]
    fn run_produces_a_typed_module_for_well_formed_input() {
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let mut types = TypeContext::new();
        let (builtin_scope, builtins) = builtin_contract::register_minimal(&mut types, &mut scopes, &mut symbols);

        let mut m = module(vec![Decl::Prop(let_decl("x", None, Some(int_lit(1))))]);
        let result = run(&mut m, builtin_scope, &builtins, scopes, symbols, types);

        assert!(!result.handler.has_errors());
        assert_eq!(m.state, ModuleState::Typed);
    }
}
