//! Anzen AST node definitions.
//!
//! This crate stands in for the parser (§1: deliberately out of scope). It
//! defines only the node *shapes* the core consumes and mutates in place —
//! no lexing, no parsing, no recovery. [`builder`] offers minimal
//! hand-construction helpers so the pipeline can be exercised without a
//! real parser; production code should otherwise treat this crate's types
//! as an external contract, not something it constructs directly.

pub mod builder;
pub mod decl;
pub mod expr;
pub mod ids;
pub mod module;
pub mod qualifier;
pub mod stmt;

pub use decl::{Decl, FunDecl, FunKind, InterfaceDecl, ParamDecl, PropDecl, StructDecl, TypeExtDecl, UnionDecl, UnionTypeCaseDecl};
pub use expr::{CallArg, CallExpr, Expr, IdentExpr, ImplicitSelectExpr, InfixExpr, LambdaExpr, PrefixExpr, SelectExpr, TypeSig, TypeSigKind};
pub use ids::{ScopeId, SymbolId, TypeId};
pub use module::{Module, ModuleState};
pub use qualifier::{BindingOp, Qualifier, QualifierSet};
pub use stmt::{Block, BindingStmt, IfStmt, ReturnStmt, Stmt, WhileStmt};
