//! Shared identities that let the AST and the semantic core refer to the
//! same scope/symbol/type without either crate owning the other's data.
//!
//! `anzen-ast` only ever stores these as `Option<...>` annotation fields on
//! its nodes; the arenas they index into (`ScopeTree`, the symbol table,
//! `TypeContext`) live in `anzen-sem`. That keeps the dependency edge
//! one-directional: `anzen-sem` depends on `anzen-ast`, never the reverse.

use anzen_util::define_idx;

define_idx!(
    /// Key into `anzen_sem::scope::ScopeTree`.
    ScopeId
);
define_idx!(
    /// Key into the symbol table built by the symbol extractor.
    SymbolId
);
define_idx!(
    /// Key into `anzen_sem::types::TypeContext`'s type arena.
    TypeId
);
