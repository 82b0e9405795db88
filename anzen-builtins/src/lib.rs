//! Anzen's standard built-in scope (§6).
//!
//! `anzen-sem` only knows the *shape* a built-in provider must have
//! ([`anzen_sem::builtin_contract::BuiltinIds`]); this crate is the one real
//! provider, adding arithmetic, comparison, and logical operators on top of
//! the bare `Int`/`Bool`/`Float`/`String`/`Nothing`/`Anything` structs that
//! [`anzen_sem::builtin_contract::register_minimal`] declares. Operators are
//! sugar for ordinary overloaded function calls (§3.1, §4.5), so every entry
//! here is just another `Function`-kind symbol in the root scope, named after
//! the operator token it implements.

use anzen_ast::{ScopeId, TypeId};
use anzen_sem::builtin_contract::{self, BuiltinIds};
use anzen_sem::qualifier_ty::QualifiedType;
use anzen_sem::scope::{ScopeTree, SymbolKind, SymbolTable};
use anzen_sem::types::{FunctionType, Type, TypeContext};
use anzen_util::Symbol;

/// Declares one overload of `name` in `scope`: a fresh `Function` symbol
/// whose type is bound up front to the concrete shape `(params) -> result`,
/// exactly like a struct's own identity in `builtin_contract::empty_struct`
/// — built-ins never go through constraint generation, so nothing else will
/// ever bind their type for them.
fn declare_operator(ctx: &mut TypeContext, scopes: &mut ScopeTree, symbols: &mut SymbolTable, scope: ScopeId, name: &str, params: &[TypeId], result: TypeId) {
    let alias_of = |ctx: &TypeContext, id: TypeId| -> Type {
        let name = ctx.nominal(id).map(|n| n.name()).unwrap_or_else(|| Symbol::intern("?"));
        Type::Alias { name, id }
    };
    let fn_ty = ctx.fresh_id();
    let shape = Type::Function(FunctionType {
        placeholders: Vec::new(),
        params: params.iter().map(|&p| (None, QualifiedType::unqualified(alias_of(ctx, p)))).collect(),
        codomain: Box::new(QualifiedType::unqualified(alias_of(ctx, result))),
    });
    ctx.bind(fn_ty, shape);

    let symbol = Symbol::intern(name);
    let sym_id = symbols.declare(symbol, SymbolKind::Function, scope);
    symbols.set_ty(sym_id, fn_ty);
    scopes.bind(scope, symbol, sym_id);
}

/// Arithmetic (`+ - * /`) plus `==`/`!=` over `ids.int` and `ids.int`,
/// yielding `ids.int`/`ids.bool_` respectively. Shared between `Int` and
/// `Float`, which carry the identical operator set (§6).
fn numeric_operators(ctx: &mut TypeContext, scopes: &mut ScopeTree, symbols: &mut SymbolTable, scope: ScopeId, operand: TypeId, bool_: TypeId) {
    for op in ["+", "-", "*", "/"] {
        declare_operator(ctx, scopes, symbols, scope, op, &[operand, operand], operand);
    }
    for op in ["==", "!=", "<", "<=", ">", ">="] {
        declare_operator(ctx, scopes, symbols, scope, op, &[operand, operand], bool_);
    }
    declare_operator(ctx, scopes, symbols, scope, "-", &[operand], operand);
}

/// Populates the full built-in scope: the six bare structs from
/// `register_minimal`, plus the operator overload set every Anzen program
/// assumes exists regardless of what it imports (§6).
pub fn populate(ctx: &mut TypeContext, scopes: &mut ScopeTree, symbols: &mut SymbolTable) -> (ScopeId, BuiltinIds) {
    let (root, ids) = builtin_contract::register_minimal(ctx, scopes, symbols);

    numeric_operators(ctx, scopes, symbols, root, ids.int, ids.bool_);
    numeric_operators(ctx, scopes, symbols, root, ids.float, ids.bool_);

    declare_operator(ctx, scopes, symbols, root, "+", &[ids.string, ids.string], ids.string);
    for op in ["==", "!="] {
        declare_operator(ctx, scopes, symbols, root, op, &[ids.string, ids.string], ids.bool_);
        declare_operator(ctx, scopes, symbols, root, op, &[ids.bool_, ids.bool_], ids.bool_);
    }

    for op in ["&&", "||"] {
        declare_operator(ctx, scopes, symbols, root, op, &[ids.bool_, ids.bool_], ids.bool_);
    }
    declare_operator(ctx, scopes, symbols, root, "!", &[ids.bool_], ids.bool_);

    (root, ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_registers_int_arithmetic_and_comparison() {
        let mut ctx = TypeContext::new();
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (root, _ids) = populate(&mut ctx, &mut scopes, &mut symbols);
        assert_eq!(scopes.lookup_local(root, Symbol::intern("+")).len(), 2, "Int and Float each contribute one +");
        assert_eq!(scopes.lookup_local(root, Symbol::intern("==")).len(), 4, "Int, Float, String, Bool each contribute one ==");
    }

    #[test]
    fn unary_minus_is_a_distinct_overload_from_binary_minus() {
        let mut ctx = TypeContext::new();
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (root, _ids) = populate(&mut ctx, &mut scopes, &mut symbols);
        // one binary `-` and one unary `-` per numeric type (Int, Float) == 4
        assert_eq!(scopes.lookup_local(root, Symbol::intern("-")).len(), 4);
    }

    #[test]
    fn logical_operators_are_registered_once_each() {
        let mut ctx = TypeContext::new();
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (root, _ids) = populate(&mut ctx, &mut scopes, &mut symbols);
        assert_eq!(scopes.lookup_local(root, Symbol::intern("&&")).len(), 1);
        assert_eq!(scopes.lookup_local(root, Symbol::intern("!")).len(), 1);
    }
}
