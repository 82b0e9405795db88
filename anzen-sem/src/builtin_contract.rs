//! The contract a built-in scope provider must satisfy (§6).
//!
//! `anzen-sem` never constructs its own built-in scope for real use — that's
//! `anzen-builtins`'s job, an external collaborator the driver wires in
//! ahead of calling [`crate::pipeline::run`]. This module exists so that
//! (a) `anzen-builtins` has a `TypeContext`/`ScopeTree`-shaped surface to
//! build against without a circular crate dependency, and (b) this crate's
//! own tests have a minimal, dependency-free stand-in rather than reaching
//! into `anzen-builtins` from a `dev-dependency` cycle.

use anzen_ast::{ScopeId, TypeId};
use indexmap::IndexMap;

use crate::scope::{ScopeTree, SymbolKind, SymbolTable};
use crate::types::{NominalType, StructType, TypeContext};

/// Stable handles to the five built-in struct types every Anzen program can
/// reference by name (§6). Literal-typing and the operator-overload fixtures
/// in `constrain.rs`/`solve.rs` key off these rather than re-resolving the
/// names through a scope lookup each time.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinIds {
    pub int: TypeId,
    pub bool_: TypeId,
    pub float: TypeId,
    pub string: TypeId,
    pub nothing: TypeId,
    pub anything: TypeId,
}

fn empty_struct(ctx: &mut TypeContext, name: &str) -> TypeId {
    let id = ctx.fresh_id();
    let symbol = anzen_util::Symbol::intern(name);
    ctx.define_nominal(NominalType::Struct(StructType {
        name: symbol,
        id,
        placeholders: Vec::new(),
        properties: IndexMap::new(),
        methods: IndexMap::new(),
    }));
    // A built-in's own identity doubles as the type variable every
    // reference to its name equates against (§4.3 rule 2, §6); bind it to
    // its own alias up front since no constraint-generation pass runs for
    // built-ins the way it does for source-level struct declarations.
    ctx.bind(id, crate::types::Type::Alias { name: symbol, id });
    id
}

/// Registers `Int`, `Bool`, `Float`, `String`, `Nothing`, `Anything` as bare
/// struct types with no methods, in a fresh root scope with no parent. Real
/// programs get their arithmetic/comparison overloads from
/// `anzen_builtins::populate`, which starts from the same ids and adds
/// methods on top.
pub fn register_minimal(ctx: &mut TypeContext, scopes: &mut ScopeTree, symbols: &mut SymbolTable) -> (ScopeId, BuiltinIds) {
    let root = scopes.push_scope(None);
    let ids = BuiltinIds {
        int: empty_struct(ctx, "Int"),
        bool_: empty_struct(ctx, "Bool"),
        float: empty_struct(ctx, "Float"),
        string: empty_struct(ctx, "String"),
        nothing: empty_struct(ctx, "Nothing"),
        anything: empty_struct(ctx, "Anything"),
    };
    for (name, id) in [
        ("Int", ids.int),
        ("Bool", ids.bool_),
        ("Float", ids.float),
        ("String", ids.string),
        ("Nothing", ids.nothing),
        ("Anything", ids.anything),
    ] {
        let symbol = anzen_util::Symbol::intern(name);
        let sym_id = symbols.declare(symbol, SymbolKind::Struct, root);
        symbols.set_ty(sym_id, id);
        scopes.bind(root, symbol, sym_id);
    }
    (root, ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_builtins_registers_all_six_names() {
        let mut ctx = TypeContext::new();
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (root, _ids) = register_minimal(&mut ctx, &mut scopes, &mut symbols);
        for name in ["Int", "Bool", "Float", "String", "Nothing", "Anything"] {
            assert!(!scopes.lookup_local(root, anzen_util::Symbol::intern(name)).is_empty());
        }
    }
}
