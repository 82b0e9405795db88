//! Shared infrastructure for the Anzen semantic analyzer: string interning,
//! typed-index arenas, opaque spans, a non-fatal diagnostics collector, and
//! per-compilation identity generators.
//!
//! Nothing in this crate knows anything about Anzen's language semantics —
//! that lives in `anzen-ast` and `anzen-sem`. This crate is the part of the
//! core that would look the same for almost any compiler front end.

pub mod diagnostic;
pub mod id_gen;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::Handler;
pub use id_gen::IdGenerator;
pub use index_vec::{Idx, IndexVec};
pub use span::Span;
pub use symbol::Symbol;
