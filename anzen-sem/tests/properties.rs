//! Property tests for §8's testable invariants. Kept separate from the
//! per-module `#[cfg(test)]` blocks the way `faxc-drv`/`fgc` keep their
//! whole-crate tests under a top-level `tests/` directory rather than
//! inline.

use std::collections::HashMap;

use anzen_sem::builtin_contract::register_minimal;
use anzen_sem::mangle::mangle;
use anzen_sem::scope::{ScopeTree, SymbolTable};
use anzen_sem::types::{specialize, types_equal, FunctionType, NominalType, StructType, Type, TypeContext};
use anzen_sem::qualifier_ty::QualifiedType;
use anzen_util::Symbol;
use indexmap::IndexMap;
use quickcheck_macros::quickcheck;

fn fresh_struct(ctx: &mut TypeContext, name: &str) -> Type {
    let id = ctx.fresh_id();
    let symbol = Symbol::intern(name);
    ctx.define_nominal(NominalType::Struct(StructType {
        name: symbol,
        id,
        placeholders: Vec::new(),
        properties: IndexMap::new(),
        methods: IndexMap::new(),
    }));
    let alias = Type::Alias { name: symbol, id };
    ctx.bind(id, alias.clone());
    alias
}

/// A small, bounded `Type` grammar for quickcheck generation: builtins and
/// functions over them, nested up to depth 2. Never contains a `Placeholder`
/// or `Var`, so specialization over it is trivially a no-op regardless of
/// mapping (I5 only claims identity for the empty mapping, but testing it
/// over types with nothing to substitute is still a faithful check of
/// "never touches what isn't there").
#[derive(Debug, Clone)]
struct SmallType(Type);

fn arbitrary_small(g: &mut quickcheck::Gen, depth: u32, int_ty: &Type, bool_ty: &Type) -> Type {
    if depth == 0 || bool::arbitrary(g) {
        if bool::arbitrary(g) {
            int_ty.clone()
        } else {
            bool_ty.clone()
        }
    } else {
        let param = arbitrary_small(g, depth - 1, int_ty, bool_ty);
        let codomain = arbitrary_small(g, depth - 1, int_ty, bool_ty);
        Type::Function(FunctionType {
            placeholders: Vec::new(),
            params: vec![(None, QualifiedType::unqualified(param))],
            codomain: Box::new(QualifiedType::unqualified(codomain)),
        })
    }
}

use quickcheck::Arbitrary;

impl Arbitrary for SmallType {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let mut ctx = TypeContext::new();
        let int_ty = fresh_struct(&mut ctx, "Int");
        let bool_ty = fresh_struct(&mut ctx, "Bool");
        SmallType(arbitrary_small(g, 2, &int_ty, &bool_ty))
    }
}

/// I3: unification (here, the coinductive equality the solver's `unify`
/// ultimately bottoms out on for alias pairs) is symmetric.
#[quickcheck]
fn i3_equality_is_symmetric(a: SmallType, b: SmallType) -> bool {
    let ctx = TypeContext::new();
    types_equal(&ctx, &a.0, &b.0) == types_equal(&ctx, &b.0, &a.0)
}

/// I5: specializing a non-generic type against an empty mapping is the
/// identity — nothing in the type can possibly match an empty mapping's
/// keys, so `specialize` must hand back an equal type unchanged.
#[quickcheck]
fn i5_specialize_with_empty_mapping_is_identity(t: SmallType) -> bool {
    let mapping: HashMap<Symbol, Type> = HashMap::new();
    specialize(&t.0, &mapping) == t.0
}

/// I6: mangling is injective on distinct nominal names — two differently
/// named structs never collide on their mangled string.
#[quickcheck]
fn i6_mangling_is_injective_on_distinct_struct_names(names: Vec<String>) -> bool {
    let names: Vec<String> = names.into_iter().filter(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_alphabetic())).collect();
    let mut distinct: Vec<String> = Vec::new();
    for n in names {
        if !distinct.contains(&n) {
            distinct.push(n);
        }
    }
    if distinct.len() < 2 {
        return true;
    }

    let mut ctx = TypeContext::new();
    let mut scopes = ScopeTree::new();
    let mut symbols = SymbolTable::new();
    let (_root, builtins) = register_minimal(&mut ctx, &mut scopes, &mut symbols);

    let mut mangled = Vec::new();
    for name in &distinct {
        let ty = fresh_struct(&mut ctx, name);
        mangled.push(mangle(&ctx, &builtins, &ty));
    }
    let mut seen = std::collections::HashSet::new();
    mangled.into_iter().all(|m| seen.insert(m))
}

/// I7: a struct referencing itself through a property compares equal to
/// itself — the memoized coinductive equality must terminate on the cycle
/// rather than recursing forever.
#[test]
fn i7_self_referential_struct_equals_itself() {
    let mut ctx = TypeContext::new();
    let id = ctx.fresh_id();
    let name = Symbol::intern("Node");
    let mut properties = IndexMap::new();
    properties.insert(Symbol::intern("next"), QualifiedType::unqualified(Type::Alias { name, id }));
    ctx.define_nominal(NominalType::Struct(StructType { name, id, placeholders: Vec::new(), properties, methods: IndexMap::new() }));
    let node = Type::Alias { name, id };
    assert!(types_equal(&ctx, &node, &node.clone()));
}
