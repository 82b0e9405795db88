//! The scope tree and symbol table (§3.4, §4.2).
//!
//! Mirrors the teacher's rib-chain scope design (`faxc-sem::scope`), but a
//! binding stores every overload registered under a name rather than a
//! single slot, since `FunDecl` symbols accumulate into an overload set
//! (§4.3 rule 3) instead of replacing one another.

use std::collections::HashMap;

use anzen_ast::{ScopeId, SymbolId, TypeId};
use anzen_util::{IndexVec, Symbol};

/// What kind of declaration a [`SemSymbol`] stands for. Drives both
/// duplicate-declaration checking (§4.3) and `find_member`'s constructor
/// rewrite (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Property,
    Parameter,
    Struct,
    Union,
    UnionCase,
    Interface,
    Placeholder,
}

impl SymbolKind {
    /// Only `Function` symbols may share a name with another symbol of the
    /// same kind in the same scope (§4.3 rule 3: overloading).
    pub fn allows_overloading(self) -> bool {
        matches!(self, SymbolKind::Function)
    }

    /// Whether a symbol of this kind names a type rather than a value — the
    /// only kinds whose identifier has type `Metatype<T>` (§3.2). Used to
    /// validate a `TypeSigKind::Named` reference before accepting it as a
    /// type (§7 `InvalidTypeIdentifier`).
    pub fn is_type_introducing(self) -> bool {
        matches!(self, SymbolKind::Struct | SymbolKind::Union | SymbolKind::Interface)
    }
}

#[derive(Debug, Clone)]
pub struct SemSymbol {
    pub name: Symbol,
    pub kind: SymbolKind,
    pub scope: ScopeId,
    /// Set by the symbol extractor to a fresh variable, later solved and
    /// reified by the type assigner (§3.4).
    pub ty: Option<TypeId>,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: IndexVec<SymbolId, SemSymbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: Symbol, kind: SymbolKind, scope: ScopeId) -> SymbolId {
        self.symbols.push(SemSymbol { name, kind, scope, ty: None })
    }

    pub fn get(&self, id: SymbolId) -> &SemSymbol {
        &self.symbols[id]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut SemSymbol {
        &mut self.symbols[id]
    }

    pub fn set_ty(&mut self, id: SymbolId, ty: TypeId) {
        self.symbols[id].ty = Some(ty);
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[derive(Debug)]
struct ScopeData {
    parent: Option<ScopeId>,
    bindings: HashMap<Symbol, Vec<SymbolId>>,
}

/// The chain of nested scopes a module's declarations and blocks open
/// (§3.4). Scope 0, when present, is conventionally the externally-supplied
/// built-in scope (§6); every module's own top-level scope is its child.
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: IndexVec<ScopeId, ScopeData>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.push(ScopeData { parent, bindings: HashMap::new() })
    }

    pub fn parent_of(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope].parent
    }

    /// Binds `symbol` under `name` in `scope`. Returns the sibling
    /// overloads already bound under that name in the same scope, so the
    /// caller (the symbol extractor) can apply the duplicate-declaration
    /// rule (§4.3 rule 3) before deciding whether to proceed.
    pub fn bind(&mut self, scope: ScopeId, name: Symbol, symbol: SymbolId) -> &[SymbolId] {
        let entry = self.scopes[scope].bindings.entry(name).or_default();
        entry.push(symbol);
        entry.as_slice()
    }

    /// All symbols bound under `name` directly in `scope`, ignoring parents.
    pub fn lookup_local(&self, scope: ScopeId, name: Symbol) -> &[SymbolId] {
        self.scopes[scope].bindings.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Walks the parent chain starting at `scope` and returns the first
    /// scope (and its full overload list) that binds `name` — the
    /// shadowing rule used by the scope binder (§4.4).
    pub fn find_defining(&self, scope: ScopeId, name: Symbol) -> Option<(ScopeId, &[SymbolId])> {
        self.find_defining_excluding(scope, name, None)
    }

    /// As [`Self::find_defining`], but a single symbol id is treated as
    /// absent everywhere it would otherwise be found. Used to resolve
    /// identifiers inside a property's own initializer (§3.5 shadowing
    /// rule, §8 scenario 2): `let x := x` must see the *outer* `x`, not the
    /// declaration currently being initialized.
    pub fn find_defining_excluding(&self, scope: ScopeId, name: Symbol, exclude: Option<SymbolId>) -> Option<(ScopeId, &[SymbolId])> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let bound = self.lookup_local(id, name);
            let all_excluded = match exclude {
                Some(skip) => !bound.is_empty() && bound.iter().all(|s| *s == skip),
                None => false,
            };
            if !bound.is_empty() && !all_excluded {
                return Some((id, bound));
            }
            current = self.parent_of(id);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_in_inner_scope_shadows_outer_binding() {
        let mut tree = ScopeTree::new();
        let mut symtab = SymbolTable::new();
        let outer = tree.push_scope(None);
        let inner = tree.push_scope(Some(outer));

        let name = Symbol::intern("x");
        let outer_sym = symtab.declare(name, SymbolKind::Property, outer);
        tree.bind(outer, name, outer_sym);
        let inner_sym = symtab.declare(name, SymbolKind::Property, inner);
        tree.bind(inner, name, inner_sym);

        let (found_scope, found) = tree.find_defining(inner, name).unwrap();
        assert_eq!(found_scope, inner);
        assert_eq!(found, &[inner_sym]);
    }

    #[test]
    fn find_defining_walks_up_when_not_locally_bound() {
        let mut tree = ScopeTree::new();
        let mut symtab = SymbolTable::new();
        let outer = tree.push_scope(None);
        let inner = tree.push_scope(Some(outer));

        let name = Symbol::intern("f");
        let sym = symtab.declare(name, SymbolKind::Function, outer);
        tree.bind(outer, name, sym);

        let (found_scope, found) = tree.find_defining(inner, name).unwrap();
        assert_eq!(found_scope, outer);
        assert_eq!(found, &[sym]);
    }

    #[test]
    fn unbound_name_finds_nothing() {
        let mut tree = ScopeTree::new();
        let scope = tree.push_scope(None);
        assert!(tree.find_defining(scope, Symbol::intern("nope")).is_none());
    }

    #[test]
    fn excluded_symbol_is_skipped_in_favor_of_an_outer_binding() {
        let mut tree = ScopeTree::new();
        let mut symtab = SymbolTable::new();
        let outer = tree.push_scope(None);
        let inner = tree.push_scope(Some(outer));
        let name = Symbol::intern("x");

        let outer_sym = symtab.declare(name, SymbolKind::Property, outer);
        tree.bind(outer, name, outer_sym);
        let inner_sym = symtab.declare(name, SymbolKind::Property, inner);
        tree.bind(inner, name, inner_sym);

        let (found_scope, found) = tree.find_defining_excluding(inner, name, Some(inner_sym)).unwrap();
        assert_eq!(found_scope, outer);
        assert_eq!(found, &[outer_sym]);
    }

    #[test]
    fn two_function_symbols_accumulate_as_an_overload_set() {
        let mut tree = ScopeTree::new();
        let mut symtab = SymbolTable::new();
        let scope = tree.push_scope(None);
        let name = Symbol::intern("f");
        let a = symtab.declare(name, SymbolKind::Function, scope);
        let b = symtab.declare(name, SymbolKind::Function, scope);
        tree.bind(scope, name, a);
        let overloads = tree.bind(scope, name, b);
        assert_eq!(overloads, &[a, b]);
    }
}
