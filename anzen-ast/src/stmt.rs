//! Statement and block nodes (§3.1).

use anzen_util::Span;

use crate::decl::Decl;
use crate::expr::Expr;
use crate::ids::ScopeId;
use crate::qualifier::BindingOp;

#[derive(Debug, Clone)]
pub enum Stmt {
    Decl(Decl),
    Binding(BindingStmt),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),
    Brace(Block),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct BindingStmt {
    pub lvalue: Expr,
    pub op: BindingOp,
    pub rvalue: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Block,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
    pub span: Span,
}

/// A scope-opening node (§3.1): every `Block` owns an inner scope, set by
/// the symbol extractor.
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
    pub inner_scope: Option<ScopeId>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Block { stmts, span, inner_scope: None }
    }
}
