//! The semantic type model (§3.2, §3.3, §4.1).
//!
//! Nominal types (struct/union/interface) are never embedded inline inside
//! `Type` — a `Type::Alias(id)` is a flat leaf that looks itself up in
//! [`TypeContext::named_types`]. That sidesteps the Rc-cycle problem a
//! directly self-referential struct (`struct Pair { let b: Pair }`, §8
//! scenario 5) would otherwise create: the cycle lives in a `HashMap`
//! keyed by identity, not in the `Type` value's own shape, which is what
//! makes the identity-pair memoization in this module (and the deep-walk
//! in `solve.rs`) able to terminate at all.

use std::collections::HashMap;

use anzen_ast::TypeId;
use anzen_util::{IdGenerator, Symbol};
use indexmap::IndexMap;

use crate::qualifier_ty::QualifiedType;

/// A semantic type (§3.2). Closed sum; no variant embeds another nominal
/// type inline — see the module doc comment.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// A fresh, unsolved type variable.
    Var(TypeId),
    /// A universally-quantified generic parameter.
    Placeholder { name: Symbol, id: TypeId },
    /// A struct, union, or interface, looked up by identity in
    /// [`TypeContext::named_types`]. An alias of an alias never arises in
    /// this language (§3.2 note): `StructDecl`/`UnionDecl`/`InterfaceDecl`
    /// are the only producers of an `Alias`, and always wrap their own
    /// fresh identity directly.
    Alias { name: Symbol, id: TypeId },
    Function(FunctionType),
    /// The type of a type expression (`Int` the identifier has type
    /// `Metatype<Int>`).
    Metatype(Box<Type>),
    /// Reference to the enclosing nominal type, used inside type bodies.
    SelfType(TypeId),
    /// Sentinel produced on resolution failure. Absorbing under unification
    /// (§7): prevents cascades.
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub placeholders: Vec<Symbol>,
    pub params: Vec<(Option<Symbol>, QualifiedType)>,
    pub codomain: Box<QualifiedType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub name: Symbol,
    pub id: TypeId,
    pub placeholders: Vec<Symbol>,
    pub properties: IndexMap<Symbol, QualifiedType>,
    pub methods: IndexMap<Symbol, Vec<FunctionType>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    pub name: Symbol,
    pub id: TypeId,
    pub placeholders: Vec<Symbol>,
    pub cases: IndexMap<Symbol, Option<QualifiedType>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    pub name: Symbol,
    pub id: TypeId,
    pub placeholders: Vec<Symbol>,
    pub members: IndexMap<Symbol, QualifiedType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NominalType {
    Struct(StructType),
    Union(UnionType),
    Interface(InterfaceType),
}

impl NominalType {
    pub fn name(&self) -> Symbol {
        match self {
            NominalType::Struct(s) => s.name,
            NominalType::Union(u) => u.name,
            NominalType::Interface(i) => i.name,
        }
    }

    pub fn id(&self) -> TypeId {
        match self {
            NominalType::Struct(s) => s.id,
            NominalType::Union(u) => u.id,
            NominalType::Interface(i) => i.id,
        }
    }

    pub fn placeholders(&self) -> &[Symbol] {
        match self {
            NominalType::Struct(s) => &s.placeholders,
            NominalType::Union(u) => &u.placeholders,
            NominalType::Interface(i) => &i.placeholders,
        }
    }
}

/// Owns every identity allocated during one compilation: the fresh-variable
/// counter, the variable→type substitution built up by the solver, and the
/// table of fully-assembled nominal types. One `TypeContext` per module
/// (§5, §9): no global counter.
#[derive(Debug, Default)]
pub struct TypeContext {
    var_gen: IdGenerator<TypeId>,
    substitutions: HashMap<TypeId, Type>,
    named_types: HashMap<TypeId, NominalType>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, globally-unique, initially-unsolved type variable.
    pub fn fresh_var(&mut self) -> Type {
        Type::Var(self.var_gen.next())
    }

    /// Reserve a fresh identity without wrapping it in any `Type` variant
    /// yet — used by the symbol extractor to mint a struct/union/interface's
    /// identity before its body has been assembled (§4.3 rule 2).
    pub fn fresh_id(&mut self) -> TypeId {
        self.var_gen.next()
    }

    pub fn bind(&mut self, var: TypeId, ty: Type) {
        self.substitutions.insert(var, ty);
    }

    pub fn binding_of(&self, var: TypeId) -> Option<&Type> {
        self.substitutions.get(&var)
    }

    pub fn is_bound(&self, var: TypeId) -> bool {
        self.substitutions.contains_key(&var)
    }

    pub fn define_nominal(&mut self, nominal: NominalType) {
        self.named_types.insert(nominal.id(), nominal);
    }

    pub fn nominal(&self, id: TypeId) -> Option<&NominalType> {
        self.named_types.get(&id)
    }

    pub fn nominal_mut(&mut self, id: TypeId) -> Option<&mut NominalType> {
        self.named_types.get_mut(&id)
    }

    /// A point-in-time copy of the solver's bindings, used by `solve.rs` to
    /// try a disjunction alternative and roll back on failure (§4.6).
    pub fn snapshot_substitutions(&self) -> HashMap<TypeId, Type> {
        self.substitutions.clone()
    }

    pub fn restore_substitutions(&mut self, snapshot: HashMap<TypeId, Type>) {
        self.substitutions = snapshot;
    }
}

/// Unordered pair of identities, used as the memo key for every
/// cycle-breaking traversal in this module (§4.1).
type MemoKey = (TypeId, TypeId);

fn memo_key(a: TypeId, b: TypeId) -> MemoKey {
    if a.0 <= b.0 {
        (a, b)
    } else {
        (b, a)
    }
}

/// Structural equality modulo cycles (§4.1). Before recursing into a pair of
/// nominal identities, the memo is pre-populated `true`; if the structural
/// check underneath later disagrees, the entry is overwritten `false`. This
/// gives termination and greatest-fixed-point semantics: two mutually
/// self-referential structs compare equal unless a concrete mismatch is
/// ever demonstrated.
pub fn types_equal(ctx: &TypeContext, a: &Type, b: &Type) -> bool {
    let mut memo = HashMap::new();
    equal_with_memo(ctx, a, b, &mut memo)
}

/// Follows `Var` bindings to the representative type the solver has bound
/// them to so far, stopping at an unbound variable or after a generous
/// depth bound (a correct solver's substitution chains never cycle, but
/// equality must not trust that blindly).
pub fn deref<'a>(ctx: &'a TypeContext, ty: &'a Type) -> &'a Type {
    let mut current = ty;
    let mut guard = 0;
    while let Type::Var(id) = current {
        match ctx.binding_of(*id) {
            Some(next) if guard < 64 => {
                current = next;
                guard += 1;
            }
            _ => break,
        }
    }
    current
}

fn equal_with_memo(ctx: &TypeContext, a: &Type, b: &Type, memo: &mut HashMap<MemoKey, bool>) -> bool {
    let a = deref(ctx, a);
    let b = deref(ctx, b);
    match (a, b) {
        (Type::Error, _) | (_, Type::Error) => true,
        (Type::Var(x), Type::Var(y)) => x == y,
        (Type::Placeholder { id: x, .. }, Type::Placeholder { id: y, .. }) => x == y,
        (Type::SelfType(x), Type::SelfType(y)) => x == y,
        (Type::Metatype(x), Type::Metatype(y)) => equal_with_memo(ctx, x, y, memo),
        (Type::Function(f1), Type::Function(f2)) => function_equal(ctx, f1, f2, memo),
        (Type::Alias { id: x, .. }, Type::Alias { id: y, .. }) => {
            if x == y {
                return true;
            }
            let key = memo_key(*x, *y);
            if let Some(&cached) = memo.get(&key) {
                return cached;
            }
            memo.insert(key, true);
            let result = match (ctx.nominal(*x), ctx.nominal(*y)) {
                (Some(nx), Some(ny)) => nominal_equal(ctx, nx, ny, memo),
                _ => false,
            };
            memo.insert(key, result);
            result
        }
        _ => false,
    }
}

fn nominal_equal(ctx: &TypeContext, a: &NominalType, b: &NominalType, memo: &mut HashMap<MemoKey, bool>) -> bool {
    if a.name() != b.name() || a.placeholders() != b.placeholders() {
        return false;
    }
    match (a, b) {
        (NominalType::Struct(s1), NominalType::Struct(s2)) => {
            s1.properties.len() == s2.properties.len()
                && s1.properties.iter().all(|(name, qty1)| {
                    s2.properties.get(name).is_some_and(|qty2| qualified_equal(ctx, qty1, qty2, memo))
                })
                && s1.methods.len() == s2.methods.len()
                && s1.methods.iter().all(|(name, overloads1)| {
                    s2.methods.get(name).is_some_and(|overloads2| {
                        overloads1.len() == overloads2.len()
                            && overloads1.iter().zip(overloads2).all(|(f1, f2)| function_equal(ctx, f1, f2, memo))
                    })
                })
        }
        (NominalType::Union(u1), NominalType::Union(u2)) => {
            u1.cases.len() == u2.cases.len()
                && u1.cases.iter().all(|(name, case1)| match (case1, u2.cases.get(name)) {
                    (None, Some(None)) => true,
                    (Some(t1), Some(Some(t2))) => qualified_equal(ctx, t1, t2, memo),
                    _ => false,
                })
        }
        (NominalType::Interface(i1), NominalType::Interface(i2)) => {
            i1.members.len() == i2.members.len()
                && i1.members.iter().all(|(name, qty1)| {
                    i2.members.get(name).is_some_and(|qty2| qualified_equal(ctx, qty1, qty2, memo))
                })
        }
        _ => false,
    }
}

fn function_equal(ctx: &TypeContext, f1: &FunctionType, f2: &FunctionType, memo: &mut HashMap<MemoKey, bool>) -> bool {
    f1.placeholders == f2.placeholders
        && f1.params.len() == f2.params.len()
        && f1.params.iter().zip(&f2.params).all(|((l1, t1), (l2, t2))| l1 == l2 && qualified_equal(ctx, t1, t2, memo))
        && qualified_equal(ctx, &f1.codomain, &f2.codomain, memo)
}

fn qualified_equal(ctx: &TypeContext, a: &QualifiedType, b: &QualifiedType, memo: &mut HashMap<MemoKey, bool>) -> bool {
    a.qualifiers == b.qualifiers && equal_with_memo(ctx, &a.ty, &b.ty, memo)
}

/// `specialize(type, with: mapping)` (§4.1): substitutes placeholders bound
/// in `mapping`, recursively, skipping placeholders that are bound by the
/// *enclosing* generic type itself (its own `placeholders` minus whatever
/// `mapping` overrides) rather than by the caller's substitution.
pub fn specialize(ty: &Type, mapping: &HashMap<Symbol, Type>) -> Type {
    let mut memo = HashMap::new();
    specialize_with_memo(ty, mapping, &mut memo)
}

fn specialize_with_memo(ty: &Type, mapping: &HashMap<Symbol, Type>, memo: &mut HashMap<TypeId, Type>) -> Type {
    match ty {
        Type::Placeholder { name, .. } => mapping.get(name).cloned().unwrap_or_else(|| ty.clone()),
        Type::Function(f) => Type::Function(specialize_function(f, mapping, memo)),
        Type::Alias { id, .. } => {
            if let Some(cached) = memo.get(id) {
                return cached.clone();
            }
            // Cycle guard: assume identity while we recurse, matching the
            // equality memo's pre-populate-true discipline (§4.1).
            memo.insert(*id, ty.clone());
            ty.clone()
        }
        Type::Metatype(inner) => Type::Metatype(Box::new(specialize_with_memo(inner, mapping, memo))),
        _ => ty.clone(),
    }
}

fn specialize_function(f: &FunctionType, mapping: &HashMap<Symbol, Type>, memo: &mut HashMap<TypeId, Type>) -> FunctionType {
    // Placeholders this function itself binds shadow the caller's mapping.
    let mut inner_mapping = mapping.clone();
    for p in &f.placeholders {
        inner_mapping.remove(p);
    }
    FunctionType {
        placeholders: f.placeholders.clone(),
        params: f
            .params
            .iter()
            .map(|(label, qty)| {
                (*label, QualifiedType { qualifiers: qty.qualifiers, ty: specialize_with_memo(&qty.ty, &inner_mapping, memo) })
            })
            .collect(),
        codomain: Box::new(QualifiedType {
            qualifiers: f.codomain.qualifiers,
            ty: specialize_with_memo(&f.codomain.ty, &inner_mapping, memo),
        }),
    }
}

/// `specialize(type, against: pattern, mapping)` (§4.1): attempts to grow
/// `mapping` so that `ty` matches `pattern`. Returns `None` on shape
/// mismatch ("no mapping").
pub fn pattern_specialize(ty: &Type, pattern: &Type, mapping: &mut HashMap<Symbol, Type>) -> Option<()> {
    match (ty, pattern) {
        (_, Type::Placeholder { name, .. }) => {
            if let Some(bound) = mapping.get(name) {
                if bound != ty {
                    return None;
                }
            } else {
                mapping.insert(*name, ty.clone());
            }
            Some(())
        }
        (Type::Placeholder { name, .. }, _) => {
            if let Some(bound) = mapping.get(name) {
                if bound != pattern {
                    return None;
                }
            } else {
                mapping.insert(*name, pattern.clone());
            }
            Some(())
        }
        (Type::Function(f1), Type::Function(f2)) => pattern_specialize_function(f1, f2, mapping),
        (Type::Alias { id: id1, .. }, Type::Alias { id: id2, .. }) if id1 == id2 => Some(()),
        (Type::Error, _) | (_, Type::Error) => Some(()),
        _ if ty == pattern => Some(()),
        _ => None,
    }
}

fn pattern_specialize_function(f1: &FunctionType, f2: &FunctionType, mapping: &mut HashMap<Symbol, Type>) -> Option<()> {
    if f1.params.len() != f2.params.len() {
        return None;
    }
    for ((l1, q1), (l2, q2)) in f1.params.iter().zip(&f2.params) {
        if l1 != l2 {
            return None;
        }
        pattern_specialize_qualified(q1, q2, mapping)?;
    }
    pattern_specialize_qualified(&f1.codomain, &f2.codomain, mapping)
}

fn pattern_specialize_qualified(a: &QualifiedType, b: &QualifiedType, mapping: &mut HashMap<Symbol, Type>) -> Option<()> {
    // "qualifier sets must either be empty on one side or be equal" (§4.1).
    if !a.qualifiers.is_empty() && !b.qualifiers.is_empty() && a.qualifiers != b.qualifiers {
        return None;
    }
    pattern_specialize(&a.ty, &b.ty, mapping)
}
