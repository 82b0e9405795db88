//! Hand-construction helpers standing in for the parser (§1: out of scope).
//!
//! Nothing downstream should depend on these outside tests: they exist so
//! the pipeline can be exercised end to end without a real Anzen parser.
//! Every node is built with `Span::DUMMY`, since no real source exists.

use anzen_util::{symbol, Span, Symbol};

use crate::decl::{Decl, FunDecl, FunKind, ParamDecl, PropDecl, StructDecl};
use crate::expr::{CallArg, CallExpr, Expr, IdentExpr, InfixExpr, TypeSig};
use crate::module::Module;
use crate::qualifier::BindingOp;
use crate::stmt::{Block, Stmt};

pub fn sym(name: &str) -> Symbol {
    Symbol::intern(name)
}

pub fn ty_sig(name: &str) -> TypeSig {
    TypeSig::named(sym(name), Span::DUMMY)
}

pub fn ident(name: &str) -> Expr {
    Expr::Ident(IdentExpr { name: sym(name), scope: None, spec_args: Vec::new(), span: Span::DUMMY, ty: None })
}

pub fn int_lit(value: i64) -> Expr {
    Expr::IntLit { value, span: Span::DUMMY, ty: None }
}

pub fn bool_lit(value: bool) -> Expr {
    Expr::BoolLit { value, span: Span::DUMMY, ty: None }
}

pub fn string_lit(value: &str) -> Expr {
    Expr::StringLit { value: value.to_string(), span: Span::DUMMY, ty: None }
}

pub fn infix(op: &str, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Infix(InfixExpr {
        op: sym(op),
        op_span: Span::DUMMY,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span: Span::DUMMY,
        ty: None,
    })
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call(CallExpr {
        callee: Box::new(callee),
        args: args
            .into_iter()
            .map(|value| CallArg { label: None, binding_op: BindingOp::Copy, value, span: Span::DUMMY })
            .collect(),
        span: Span::DUMMY,
        ty: None,
    })
}

pub fn let_decl(name: &str, signature: Option<TypeSig>, init: Option<Expr>) -> PropDecl {
    let mut decl = PropDecl::new(sym(name), Span::DUMMY);
    decl.signature = signature;
    decl.init = init.map(|e| (BindingOp::Copy, e));
    decl
}

pub fn param(name: &str, signature: TypeSig) -> ParamDecl {
    ParamDecl::new(sym(name), signature, Span::DUMMY)
}

pub fn fun_decl(name: &str, params: Vec<ParamDecl>, codomain: Option<TypeSig>, body: Vec<Stmt>) -> FunDecl {
    let mut decl = FunDecl::new(sym(name), FunKind::Regular, Span::DUMMY);
    decl.params = params;
    decl.codomain = codomain;
    decl.body = Some(Block::new(body, Span::DUMMY));
    decl
}

pub fn constructor_decl(params: Vec<ParamDecl>, codomain: Option<TypeSig>) -> FunDecl {
    let mut decl = FunDecl::new(symbol::kw_new(), FunKind::Constructor, Span::DUMMY);
    decl.params = params;
    decl.codomain = codomain;
    decl.body = Some(Block::new(Vec::new(), Span::DUMMY));
    decl
}

pub fn struct_decl(name: &str, members: Vec<Decl>) -> StructDecl {
    let mut decl = StructDecl::new(sym(name), Span::DUMMY);
    decl.members = members;
    decl
}

pub fn module(decls: Vec<Decl>) -> Module {
    Module::new(decls, Span::DUMMY)
}
