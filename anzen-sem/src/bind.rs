//! Pass 2: scope binding (§4.4).
//!
//! Resolves every `Ident`/`TypeSig::Named` to the scope that defines it,
//! recording that scope (not a specific symbol — a name may still be
//! overloaded) on the node. `SelectExpr`/`ImplicitSelectExpr.ownee_scope`
//! is deliberately left `None` here: it depends on the owner's type, which
//! constraint solving hasn't computed yet (§3.1).

use anzen_ast::{Block, Decl, Expr, FunDecl, IfStmt, InterfaceDecl, Module, ParamDecl, PropDecl, ScopeId, Stmt, StructDecl, SymbolId, TypeSig, TypeSigKind, UnionDecl, WhileStmt};
use anzen_util::{Handler, Symbol};

use crate::diagnostics::AnzenError;
use crate::scope::ScopeTree;

pub struct ScopeBinder<'a> {
    pub scopes: &'a ScopeTree,
    pub handler: &'a mut Handler<AnzenError>,
}

impl<'a> ScopeBinder<'a> {
    pub fn new(scopes: &'a ScopeTree, handler: &'a mut Handler<AnzenError>) -> Self {
        ScopeBinder { scopes, handler }
    }

    pub fn run(&mut self, module: &mut Module) {
        debug_assert!(module.state.precedes(anzen_ast::ModuleState::ScopesBound));
        tracing::debug!("pass 2 (scope binding) entered");
        let scope = module.inner_scope.expect("pass 1 must run before pass 2");
        for decl in &mut module.decls {
            self.bind_decl(decl, scope);
        }
        module.state = anzen_ast::ModuleState::ScopesBound;
        tracing::debug!("pass 2 (scope binding) exited");
    }

    /// Resolves `name` from `scope`, excluding `exclude` (the shadowing
    /// rule, §3.5/§8 scenario 2), emitting `UndefinedSymbol` on failure.
    /// Shared with `constrain.rs`, which needs the identical lookup to
    /// resolve the synthetic identifier an `InfixExpr`/`PrefixExpr`
    /// desugars to (§4.5).
    pub fn resolve(&mut self, scope: ScopeId, name: Symbol, exclude: Option<SymbolId>, span: anzen_util::Span) -> Option<ScopeId> {
        match self.scopes.find_defining_excluding(scope, name, exclude) {
            Some((found, _)) => Some(found),
            None => {
                self.handler.emit(AnzenError::UndefinedSymbol { name, span });
                None
            }
        }
    }

    fn bind_decl(&mut self, decl: &mut Decl, scope: ScopeId) {
        match decl {
            Decl::Fun(d) => self.bind_fun(d),
            Decl::Prop(d) => self.bind_prop(d, scope),
            Decl::Struct(d) => self.bind_struct(d),
            Decl::Union(d) => self.bind_union(d),
            Decl::Interface(d) => self.bind_interface(d),
            Decl::TypeExt(d) => {
                let inner = d.inner_scope.expect("pass 1 must run before pass 2");
                self.bind_type_sig(&mut d.extended, d.scope.expect("pass 1 must run before pass 2"));
                for member in &mut d.members {
                    self.bind_decl(member, inner);
                }
            }
        }
    }

    fn bind_fun(&mut self, decl: &mut FunDecl) {
        let inner = decl.inner_scope.expect("pass 1 must run before pass 2");
        for param in &mut decl.params {
            self.bind_param(param, inner);
        }
        if let Some(codomain) = &mut decl.codomain {
            self.bind_type_sig(codomain, inner);
        }
        if let Some(body) = &mut decl.body {
            self.bind_block(body);
        }
    }

    fn bind_param(&mut self, decl: &mut ParamDecl, scope: ScopeId) {
        self.bind_type_sig(&mut decl.signature, scope);
        if let Some(default) = &mut decl.default {
            self.bind_expr(default, scope);
        }
    }

    fn bind_prop(&mut self, decl: &mut PropDecl, scope: ScopeId) {
        if let Some(signature) = &mut decl.signature {
            self.bind_type_sig(signature, scope);
        }
        if let Some((_, init)) = &mut decl.init {
            self.bind_expr_excluding(init, scope, decl.symbol);
        }
    }

    fn bind_struct(&mut self, decl: &mut StructDecl) {
        let inner = decl.inner_scope.expect("pass 1 must run before pass 2");
        for member in &mut decl.members {
            self.bind_decl(member, inner);
        }
    }

    fn bind_union(&mut self, decl: &mut UnionDecl) {
        let inner = decl.inner_scope.expect("pass 1 must run before pass 2");
        for case in &mut decl.cases {
            if let Some(signature) = &mut case.signature {
                self.bind_type_sig(signature, inner);
            }
        }
    }

    fn bind_interface(&mut self, decl: &mut InterfaceDecl) {
        let inner = decl.inner_scope.expect("pass 1 must run before pass 2");
        for member in &mut decl.members {
            self.bind_decl(member, inner);
        }
    }

    fn bind_type_sig(&mut self, sig: &mut TypeSig, scope: ScopeId) {
        match &mut sig.kind {
            TypeSigKind::Named { name, scope: resolved, spec_args } => {
                *resolved = self.resolve(scope, *name, None, sig.span);
                for arg in spec_args {
                    self.bind_type_sig(arg, scope);
                }
            }
            TypeSigKind::Qualified { inner, .. } => self.bind_type_sig(inner, scope),
        }
    }

    fn bind_block(&mut self, block: &mut Block) {
        let inner = block.inner_scope.expect("pass 1 must run before pass 2");
        for stmt in &mut block.stmts {
            self.bind_stmt(stmt, inner);
        }
    }

    fn bind_stmt(&mut self, stmt: &mut Stmt, scope: ScopeId) {
        match stmt {
            Stmt::Decl(d) => self.bind_decl(d, scope),
            Stmt::Binding(b) => {
                self.bind_expr(&mut b.lvalue, scope);
                self.bind_expr(&mut b.rvalue, scope);
            }
            Stmt::Return(r) => {
                if let Some(value) = &mut r.value {
                    self.bind_expr(value, scope);
                }
            }
            Stmt::If(s) => self.bind_if(s, scope),
            Stmt::While(s) => self.bind_while(s, scope),
            Stmt::Brace(b) => self.bind_block(b),
            Stmt::Expr(e) => self.bind_expr(e, scope),
        }
    }

    fn bind_if(&mut self, stmt: &mut IfStmt, scope: ScopeId) {
        self.bind_expr(&mut stmt.cond, scope);
        self.bind_block(&mut stmt.then_branch);
        if let Some(else_branch) = &mut stmt.else_branch {
            self.bind_stmt(else_branch, scope);
        }
    }

    fn bind_while(&mut self, stmt: &mut WhileStmt, scope: ScopeId) {
        self.bind_expr(&mut stmt.cond, scope);
        self.bind_block(&mut stmt.body);
    }

    fn bind_expr(&mut self, expr: &mut Expr, scope: ScopeId) {
        self.bind_expr_excluding(expr, scope, None);
    }

    fn bind_expr_excluding(&mut self, expr: &mut Expr, scope: ScopeId, exclude: Option<SymbolId>) {
        match expr {
            Expr::Ident(e) => {
                e.scope = self.resolve(scope, e.name, exclude, e.span);
                for arg in &mut e.spec_args {
                    self.bind_type_sig(arg, scope);
                }
            }
            Expr::Select(e) => self.bind_expr_excluding(&mut e.owner, scope, exclude),
            // ownee_scope stays None: resolved once the owner's type is known (§3.1).
            Expr::ImplicitSelect(_) => {}
            Expr::Call(e) => {
                self.bind_expr_excluding(&mut e.callee, scope, exclude);
                for arg in &mut e.args {
                    self.bind_expr_excluding(&mut arg.value, scope, exclude);
                }
            }
            Expr::BoolLit { .. } | Expr::IntLit { .. } | Expr::FloatLit { .. } | Expr::StringLit { .. } => {}
            Expr::Infix(e) => {
                self.bind_expr_excluding(&mut e.lhs, scope, exclude);
                self.bind_expr_excluding(&mut e.rhs, scope, exclude);
            }
            Expr::Prefix(e) => self.bind_expr_excluding(&mut e.operand, scope, exclude),
            Expr::Paren { inner, .. } => self.bind_expr_excluding(inner, scope, exclude),
            Expr::Lambda(e) => {
                let inner = e.inner_scope.unwrap_or(scope);
                for param in &mut e.params {
                    self.bind_param(param, inner);
                }
                if let Some(codomain) = &mut e.codomain {
                    self.bind_type_sig(codomain, inner);
                }
                self.bind_block(&mut e.body);
            }
            Expr::ArrayLit { elements, .. } | Expr::SetLit { elements, .. } => {
                for e in elements {
                    self.bind_expr_excluding(e, scope, exclude);
                }
            }
            Expr::MapLit { entries, .. } => {
                for (k, v) in entries {
                    self.bind_expr_excluding(k, scope, exclude);
                    self.bind_expr_excluding(v, scope, exclude);
                }
            }
            Expr::UnsafeCast { expr, target, .. } => {
                self.bind_expr_excluding(expr, scope, exclude);
                self.bind_type_sig(target, scope);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::SymbolExtractor;
    use crate::types::TypeContext;
    use anzen_ast::builder::*;
    use anzen_ast::Decl;

    fn run_passes(mut m: Module) -> (Module, ScopeTree, Handler<AnzenError>) {
        let mut scopes = ScopeTree::new();
        let mut symbols = crate::scope::SymbolTable::new();
        let mut types = TypeContext::new();
        let mut extract_handler = Handler::new();
        SymbolExtractor::new(&mut scopes, &mut symbols, &mut types, &mut extract_handler).run(&mut m, None);
        let mut bind_handler = Handler::new();
        ScopeBinder::new(&scopes, &mut bind_handler).run(&mut m);
        (m, scopes, bind_handler)
    }

    #[test]
    fn ident_referring_to_a_sibling_prop_resolves() {
        let m = module(vec![
            Decl::Prop(let_decl("x", None, Some(int_lit(1)))),
            Decl::Prop(let_decl("y", None, Some(ident("x")))),
        ]);
        let (m, _scopes, handler) = run_passes(m);
        assert!(!handler.has_errors());
        let Decl::Prop(y) = &m.decls[1] else { panic!() };
        let Some((_, y_init)) = &y.init else { panic!() };
        let Expr::Ident(e) = y_init else { panic!() };
        assert!(e.scope.is_some());
    }

    #[test]
    fn undefined_identifier_is_reported() {
        let m = module(vec![Decl::Prop(let_decl("y", None, Some(ident("nope"))))]);
        let (_, _, handler) = run_passes(m);
        assert!(handler.has_errors());
    }

    #[test]
    fn initializer_shadowing_rule_skips_its_own_declaration() {
        // let x := x  — the rhs `x` must bind to an outer `x`, not itself.
        let m = module(vec![
            Decl::Prop(let_decl("x", None, Some(int_lit(1)))),
            Decl::Fun(fun_decl(
                "f",
                vec![],
                None,
                vec![Stmt::Decl(Decl::Prop(let_decl("x", None, Some(ident("x")))))],
            )),
        ]);
        let (m, scopes, handler) = run_passes(m);
        assert!(!handler.has_errors());
        let Decl::Fun(f) = &m.decls[1] else { panic!() };
        let body = f.body.as_ref().unwrap();
        let Stmt::Decl(Decl::Prop(inner_x)) = &body.stmts[0] else { panic!() };
        let Some((_, init)) = &inner_x.init else { panic!() };
        let Expr::Ident(e) = init else { panic!() };
        let resolved = e.scope.unwrap();
        assert_ne!(resolved, body.inner_scope.unwrap());
        let _ = scopes;
    }
}
