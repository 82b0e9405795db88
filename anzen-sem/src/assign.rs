//! Pass 5: type assignment (§4.7, §4.8).
//!
//! The solver has already done the real work; this pass just walks the AST
//! one more time, dereferencing every node's `ty` variable to its final
//! [`Type`] and deciding the module's terminal [`ModuleState`] along the
//! way. A node whose variable never got bound at all reports
//! `InferenceError` and has its variable rebound to `Type::Error` on the
//! spot, so later lookups of the same id see `Error` rather than the same
//! dead `Var`; one that already resolves to `Type::Error` (because an
//! earlier pass already reported something about it) does not get a second
//! diagnostic — that would just be noise on top of the real cause.

use anzen_ast::{Block, Decl, Expr, FunDecl, IfStmt, InterfaceDecl, Module, ModuleState, ParamDecl, PropDecl, Stmt, StructDecl, TypeId, TypeSig, TypeSigKind, UnionDecl, WhileStmt};
use anzen_util::{Handler, Span};

use crate::diagnostics::AnzenError;
use crate::types::{self, Type, TypeContext};

pub struct TypeAssigner<'a> {
    types: &'a mut TypeContext,
    handler: &'a mut Handler<AnzenError>,
}

impl<'a> TypeAssigner<'a> {
    pub fn new(types: &'a mut TypeContext, handler: &'a mut Handler<AnzenError>) -> Self {
        TypeAssigner { types, handler }
    }

    /// Reifies every `ty` slot and sets the module's final state (§4.8):
    /// `Typed` if this pass (and everything upstream) added no diagnostics,
    /// `Errored` otherwise.
    pub fn run(mut self, module: &mut Module) {
        tracing::debug!("pass 5 (type assignment) entered");
        for decl in &mut module.decls {
            self.assign_decl(decl);
        }
        module.state = if self.handler.has_errors() { ModuleState::Errored } else { ModuleState::Typed };
        tracing::debug!(state = ?module.state, "pass 5 (type assignment) exited");
    }

    /// Looks up the final value a variable resolved to. A variable that
    /// never got bound by the solver reaches here unbound; that is itself
    /// the diagnostic (§4.7 "exactly one binding" rule, none-case). The
    /// variable is rebound to `Type::Error` on the spot, so any later lookup
    /// of the same `TypeId` (e.g. through a sibling reference) dereferences
    /// to `Error` instead of reaching the same dead `Var` again (§3.5: no
    /// type field may carry an unsolved variable once this pass finishes).
    fn finalize(&mut self, id: TypeId, span: Span) -> Type {
        let resolved = types::deref(self.types, &Type::Var(id)).clone();
        if matches!(resolved, Type::Var(_)) {
            self.handler.emit(AnzenError::InferenceError { span });
            self.types.bind(id, Type::Error);
            Type::Error
        } else {
            resolved
        }
    }

    fn assign_decl(&mut self, decl: &mut Decl) {
        match decl {
            Decl::Fun(d) => self.assign_fun(d),
            Decl::Prop(d) => self.assign_prop(d),
            Decl::Struct(d) => self.assign_struct(d),
            Decl::Union(d) => self.assign_union(d),
            Decl::Interface(d) => self.assign_interface(d),
            Decl::TypeExt(d) => {
                self.assign_type_sig(&mut d.extended);
                for member in &mut d.members {
                    self.assign_decl(member);
                }
            }
        }
    }

    fn assign_fun(&mut self, decl: &mut FunDecl) {
        if let Some(ty) = decl.ty {
            self.finalize(ty, decl.span);
        }
        for param in &mut decl.params {
            self.assign_param(param);
        }
        if let Some(codomain) = &mut decl.codomain {
            self.assign_type_sig(codomain);
        }
        if let Some(body) = &mut decl.body {
            self.assign_block(body);
        }
    }

    fn assign_param(&mut self, decl: &mut ParamDecl) {
        if let Some(ty) = decl.ty {
            self.finalize(ty, decl.span);
        }
        self.assign_type_sig(&mut decl.signature);
        if let Some(default) = &mut decl.default {
            self.assign_expr(default);
        }
    }

    fn assign_prop(&mut self, decl: &mut PropDecl) {
        if let Some(ty) = decl.ty {
            self.finalize(ty, decl.span);
        }
        if let Some(signature) = &mut decl.signature {
            self.assign_type_sig(signature);
        }
        if let Some((_, init)) = &mut decl.init {
            self.assign_expr(init);
        }
    }

    fn assign_struct(&mut self, decl: &mut StructDecl) {
        if let Some(ty) = decl.ty {
            self.finalize(ty, decl.span);
        }
        for member in &mut decl.members {
            self.assign_decl(member);
        }
    }

    fn assign_union(&mut self, decl: &mut UnionDecl) {
        if let Some(ty) = decl.ty {
            self.finalize(ty, decl.span);
        }
        for case in &mut decl.cases {
            if let Some(ty) = case.ty {
                self.finalize(ty, case.span);
            }
            if let Some(signature) = &mut case.signature {
                self.assign_type_sig(signature);
            }
        }
    }

    fn assign_interface(&mut self, decl: &mut InterfaceDecl) {
        if let Some(ty) = decl.ty {
            self.finalize(ty, decl.span);
        }
        for member in &mut decl.members {
            self.assign_decl(member);
        }
    }

    fn assign_type_sig(&mut self, sig: &mut TypeSig) {
        if let Some(ty) = sig.ty {
            self.finalize(ty, sig.span);
        }
        match &mut sig.kind {
            TypeSigKind::Named { spec_args, .. } => {
                for arg in spec_args {
                    self.assign_type_sig(arg);
                }
            }
            TypeSigKind::Qualified { inner, .. } => self.assign_type_sig(inner),
        }
    }

    fn assign_block(&mut self, block: &mut Block) {
        for stmt in &mut block.stmts {
            self.assign_stmt(stmt);
        }
    }

    fn assign_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Decl(d) => self.assign_decl(d),
            Stmt::Binding(b) => {
                self.assign_expr(&mut b.lvalue);
                self.assign_expr(&mut b.rvalue);
            }
            Stmt::Return(r) => {
                if let Some(value) = &mut r.value {
                    self.assign_expr(value);
                }
            }
            Stmt::If(s) => self.assign_if(s),
            Stmt::While(s) => self.assign_while(s),
            Stmt::Brace(b) => self.assign_block(b),
            Stmt::Expr(e) => self.assign_expr(e),
        }
    }

    fn assign_if(&mut self, stmt: &mut IfStmt) {
        self.assign_expr(&mut stmt.cond);
        self.assign_block(&mut stmt.then_branch);
        if let Some(else_branch) = &mut stmt.else_branch {
            self.assign_stmt(else_branch);
        }
    }

    fn assign_while(&mut self, stmt: &mut WhileStmt) {
        self.assign_expr(&mut stmt.cond);
        self.assign_block(&mut stmt.body);
    }

    fn assign_expr(&mut self, expr: &mut Expr) {
        if let Some(id) = expr.ty() {
            let span = expr.span();
            self.finalize(id, span);
        }
        match expr {
            Expr::Ident(e) => {
                for arg in &mut e.spec_args {
                    self.assign_type_sig(arg);
                }
            }
            Expr::Select(e) => self.assign_expr(&mut e.owner),
            Expr::ImplicitSelect(_) => {}
            Expr::Call(e) => {
                self.assign_expr(&mut e.callee);
                for arg in &mut e.args {
                    self.assign_expr(&mut arg.value);
                }
            }
            Expr::BoolLit { .. } | Expr::IntLit { .. } | Expr::FloatLit { .. } | Expr::StringLit { .. } => {}
            Expr::Infix(e) => {
                self.assign_expr(&mut e.lhs);
                self.assign_expr(&mut e.rhs);
            }
            Expr::Prefix(e) => self.assign_expr(&mut e.operand),
            Expr::Paren { inner, .. } => self.assign_expr(inner),
            Expr::Lambda(e) => {
                for param in &mut e.params {
                    self.assign_param(param);
                }
                if let Some(codomain) = &mut e.codomain {
                    self.assign_type_sig(codomain);
                }
                self.assign_block(&mut e.body);
            }
            Expr::ArrayLit { elements, .. } | Expr::SetLit { elements, .. } => {
                for e in elements {
                    self.assign_expr(e);
                }
            }
            Expr::MapLit { entries, .. } => {
                for (k, v) in entries {
                    self.assign_expr(k);
                    self.assign_expr(v);
                }
            }
            Expr::UnsafeCast { expr, target, .. } => {
                self.assign_expr(expr);
                self.assign_type_sig(target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::ScopeBinder;
    use crate::builtin_contract::register_minimal;
    use crate::constrain::ConstraintGenerator;
    use crate::extract::SymbolExtractor;
    use crate::scope::{ScopeTree, SymbolTable};
    use crate::solve::Solver;
    use anzen_ast::builder::*;
    use anzen_ast::Decl;

    fn run_pipeline(mut m: Module) -> (Module, Handler<AnzenError>) {
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let mut types = TypeContext::new();
        let mut handler = Handler::new();
        let (builtin_scope, builtins) = register_minimal(&mut types, &mut scopes, &mut symbols);
        SymbolExtractor::new(&mut scopes, &mut symbols, &mut types, &mut handler).run(&mut m, Some(builtin_scope));
        ScopeBinder::new(&scopes, &mut handler).run(&mut m);
        let constraints = ConstraintGenerator::new(&scopes, &symbols, &mut types, &builtins, &mut handler).run(&mut m);
        Solver::new(&mut types, &mut handler).run(constraints);
        TypeAssigner::new(&mut types, &mut handler).run(&mut m);
        (m, handler)
    }

    #[test]
    fn a_well_typed_module_ends_up_typed() {
        let m = module(vec![Decl::Prop(let_decl("x", None, Some(int_lit(1))))]);
        let (m, handler) = run_pipeline(m);
        assert!(!handler.has_errors());
        assert_eq!(m.state, ModuleState::Typed);
    }

    #[test]
    fn an_undefined_symbol_ends_up_errored() {
        let m = module(vec![Decl::Prop(let_decl("y", None, Some(ident("nope"))))]);
        let (m, handler) = run_pipeline(m);
        assert!(handler.has_errors());
        assert_eq!(m.state, ModuleState::Errored);
    }

    #[test]
    fn every_literal_gets_a_concrete_builtin_type() {
        let m = module(vec![Decl::Prop(let_decl("x", None, Some(int_lit(1))))]);
        let (m, _handler) = run_pipeline(m);
        let Decl::Prop(x) = &m.decls[0] else { panic!() };
        let Some((_, init)) = &x.init else { panic!() };
        assert!(init.ty().is_some());
    }
}
