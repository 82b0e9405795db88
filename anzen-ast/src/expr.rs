//! Expression and type-signature nodes (§3.1).

use anzen_util::{Span, Symbol};

use crate::decl::ParamDecl;
use crate::ids::{ScopeId, TypeId};
use crate::qualifier::{BindingOp, QualifierSet};
use crate::stmt::Block;

/// A type as written in source, before it has been resolved to a semantic
/// type. Typed (§3.1): `ty` starts `None`, is set to a fresh variable by
/// the constraint generator, and is reified by the type assigner.
#[derive(Debug, Clone)]
pub struct TypeSig {
    pub kind: TypeSigKind,
    pub span: Span,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub enum TypeSigKind {
    /// A named type, optionally applied to specialization arguments
    /// (`Pair<Int>`). Scoped: resolved by the scope binder like any `Ident`.
    Named { name: Symbol, scope: Option<ScopeId>, spec_args: Vec<TypeSig> },
    /// A qualified type signature (`@mut Int`).
    Qualified { qualifiers: QualifierSet, qualifier_spans: Vec<Span>, inner: Box<TypeSig> },
}

impl TypeSig {
    pub fn named(name: Symbol, span: Span) -> Self {
        TypeSig { kind: TypeSigKind::Named { name, scope: None, spec_args: Vec::new() }, span, ty: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone)]
pub enum Expr {
    Ident(IdentExpr),
    Select(SelectExpr),
    ImplicitSelect(ImplicitSelectExpr),
    Call(CallExpr),
    BoolLit { value: bool, span: Span, ty: Option<TypeId> },
    IntLit { value: i64, span: Span, ty: Option<TypeId> },
    FloatLit { value: f64, span: Span, ty: Option<TypeId> },
    StringLit { value: String, span: Span, ty: Option<TypeId> },
    Infix(InfixExpr),
    Prefix(PrefixExpr),
    Paren { inner: Box<Expr>, span: Span, ty: Option<TypeId> },
    Lambda(LambdaExpr),
    ArrayLit { elements: Vec<Expr>, span: Span, ty: Option<TypeId> },
    SetLit { elements: Vec<Expr>, span: Span, ty: Option<TypeId> },
    MapLit { entries: Vec<(Expr, Expr)>, span: Span, ty: Option<TypeId> },
    UnsafeCast { expr: Box<Expr>, target: TypeSig, span: Span, ty: Option<TypeId> },
}

#[derive(Debug, Clone)]
pub struct IdentExpr {
    pub name: Symbol,
    pub scope: Option<ScopeId>,
    pub spec_args: Vec<TypeSig>,
    pub span: Span,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct SelectExpr {
    pub owner: Box<Expr>,
    pub ownee: Symbol,
    /// Left unresolved by the scope binder (§4.4): depends on the owner's
    /// type, which is not known until constraint solving.
    pub ownee_scope: Option<ScopeId>,
    pub span: Span,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct ImplicitSelectExpr {
    pub ownee: Symbol,
    pub ownee_scope: Option<ScopeId>,
    pub span: Span,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<CallArg>,
    pub span: Span,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct CallArg {
    pub label: Option<Symbol>,
    pub binding_op: BindingOp,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InfixExpr {
    pub op: Symbol,
    pub op_span: Span,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct PrefixExpr {
    pub op: Symbol,
    pub op_span: Span,
    pub operand: Box<Expr>,
    pub span: Span,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct LambdaExpr {
    pub params: Vec<ParamDecl>,
    pub codomain: Option<TypeSig>,
    pub body: Block,
    pub inner_scope: Option<ScopeId>,
    pub span: Span,
    pub ty: Option<TypeId>,
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(e) => e.span,
            Expr::Select(e) => e.span,
            Expr::ImplicitSelect(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::BoolLit { span, .. }
            | Expr::IntLit { span, .. }
            | Expr::FloatLit { span, .. }
            | Expr::StringLit { span, .. } => *span,
            Expr::Infix(e) => e.span,
            Expr::Prefix(e) => e.span,
            Expr::Paren { span, .. } => *span,
            Expr::Lambda(e) => e.span,
            Expr::ArrayLit { span, .. } | Expr::SetLit { span, .. } | Expr::MapLit { span, .. } => *span,
            Expr::UnsafeCast { span, .. } => *span,
        }
    }

    /// The type annotation field, present from pass 3 onward (§3.5).
    pub fn ty(&self) -> Option<TypeId> {
        match self {
            Expr::Ident(e) => e.ty,
            Expr::Select(e) => e.ty,
            Expr::ImplicitSelect(e) => e.ty,
            Expr::Call(e) => e.ty,
            Expr::BoolLit { ty, .. }
            | Expr::IntLit { ty, .. }
            | Expr::FloatLit { ty, .. }
            | Expr::StringLit { ty, .. } => *ty,
            Expr::Infix(e) => e.ty,
            Expr::Prefix(e) => e.ty,
            Expr::Paren { ty, .. } => *ty,
            Expr::Lambda(e) => e.ty,
            Expr::ArrayLit { ty, .. } | Expr::SetLit { ty, .. } | Expr::MapLit { ty, .. } => *ty,
            Expr::UnsafeCast { ty, .. } => *ty,
        }
    }

    pub fn set_ty(&mut self, new_ty: TypeId) {
        let slot = match self {
            Expr::Ident(e) => &mut e.ty,
            Expr::Select(e) => &mut e.ty,
            Expr::ImplicitSelect(e) => &mut e.ty,
            Expr::Call(e) => &mut e.ty,
            Expr::BoolLit { ty, .. }
            | Expr::IntLit { ty, .. }
            | Expr::FloatLit { ty, .. }
            | Expr::StringLit { ty, .. } => ty,
            Expr::Infix(e) => &mut e.ty,
            Expr::Prefix(e) => &mut e.ty,
            Expr::Paren { ty, .. } => ty,
            Expr::Lambda(e) => &mut e.ty,
            Expr::ArrayLit { ty, .. } | Expr::SetLit { ty, .. } | Expr::MapLit { ty, .. } => ty,
            Expr::UnsafeCast { ty, .. } => ty,
        };
        *slot = Some(new_ty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_literal_has_no_type_until_assigned() {
        let lit = Expr::IntLit { value: 0, span: Span::DUMMY, ty: None };
        assert_eq!(lit.ty(), None);
    }

    #[test]
    fn set_ty_is_visible_through_ty_accessor() {
        let mut lit = Expr::IntLit { value: 0, span: Span::DUMMY, ty: None };
        lit.set_ty(TypeId(3));
        assert_eq!(lit.ty(), Some(TypeId(3)));
    }
}
