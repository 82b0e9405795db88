//! Pass 1: symbol extraction (§4.3).
//!
//! Walks every scope-opening node, creates its scope, and declares a
//! [`crate::scope::SemSymbol`] for every declaration it finds — without
//! looking at identifiers or expressions at all (that's pass 2's job). Only
//! this pass may create scopes or declare symbols; every later pass treats
//! the scope tree and symbol table as append-only with respect to bindings.

use anzen_ast::{Block, Decl, FunDecl, InterfaceDecl, Module, ParamDecl, PropDecl, StructDecl, UnionDecl};
use anzen_util::{Handler, Span};

use crate::diagnostics::AnzenError;
use crate::scope::{ScopeTree, SymbolKind, SymbolTable};
use crate::types::TypeContext;

pub struct SymbolExtractor<'a> {
    pub scopes: &'a mut ScopeTree,
    pub symbols: &'a mut SymbolTable,
    pub types: &'a mut TypeContext,
    pub handler: &'a mut Handler<AnzenError>,
}

impl<'a> SymbolExtractor<'a> {
    pub fn new(
        scopes: &'a mut ScopeTree,
        symbols: &'a mut SymbolTable,
        types: &'a mut TypeContext,
        handler: &'a mut Handler<AnzenError>,
    ) -> Self {
        SymbolExtractor { scopes, symbols, types, handler }
    }

    /// Runs pass 1 over `module`, whose `inner_scope` becomes a fresh child
    /// of `builtin_scope` (§4.2: the built-in scope is the root of every
    /// module's own scope chain).
    pub fn run(&mut self, module: &mut Module, builtin_scope: Option<anzen_ast::ScopeId>) {
        debug_assert!(module.state.precedes(anzen_ast::ModuleState::SymbolsExtracted));
        tracing::debug!(decls = module.decls.len(), "pass 1 (symbol extraction) entered");
        let module_scope = self.scopes.push_scope(builtin_scope);
        module.inner_scope = Some(module_scope);
        for decl in &mut module.decls {
            self.extract_decl(decl, module_scope);
        }
        module.state = anzen_ast::ModuleState::SymbolsExtracted;
        tracing::debug!("pass 1 (symbol extraction) exited");
    }

    /// Declares `name` in `scope`, applying the overload rule (§4.3 rule 3):
    /// a second `Function` symbol joins the existing overload set silently;
    /// any other repeat is a `DuplicateDeclaration`. Every declared symbol
    /// is given its own fresh type identity immediately, regardless of how
    /// long it takes a later pass to bind that identity to a concrete type —
    /// `Ident` resolution (pass 3) needs a stable handle to unify against
    /// the moment a name is in scope, not just once its own declaration has
    /// been processed.
    fn declare(&mut self, name: anzen_util::Symbol, kind: SymbolKind, scope: anzen_ast::ScopeId, span: Span) -> (anzen_ast::SymbolId, anzen_ast::TypeId) {
        let existing = self.scopes.lookup_local(scope, name).to_vec();
        if !existing.is_empty() && !kind.allows_overloading() {
            let previous = self.symbols.get(existing[0]).scope;
            let _ = previous;
            self.handler.emit(AnzenError::DuplicateDeclaration { name, span, previous: span });
        }
        let id = self.symbols.declare(name, kind, scope);
        self.scopes.bind(scope, name, id);
        let ty_id = self.types.fresh_id();
        self.symbols.set_ty(id, ty_id);
        (id, ty_id)
    }

    fn extract_decl(&mut self, decl: &mut Decl, scope: anzen_ast::ScopeId) {
        match decl {
            Decl::Fun(d) => self.extract_fun(d, scope),
            Decl::Prop(d) => self.extract_prop(d, scope),
            Decl::Struct(d) => self.extract_struct(d, scope),
            Decl::Union(d) => self.extract_union(d, scope),
            Decl::Interface(d) => self.extract_interface(d, scope),
            Decl::TypeExt(d) => {
                let inner = self.scopes.push_scope(Some(scope));
                d.scope = Some(scope);
                d.inner_scope = Some(inner);
                for member in &mut d.members {
                    self.extract_decl(member, inner);
                }
            }
        }
    }

    fn extract_fun(&mut self, decl: &mut FunDecl, scope: anzen_ast::ScopeId) {
        let (symbol, ty_id) = self.declare(decl.name, SymbolKind::Function, scope, decl.span);
        decl.scope = Some(scope);
        decl.symbol = Some(symbol);
        decl.ty = Some(ty_id);

        // Parameters and placeholders live in the function's own scope
        // (rule 4), distinct from the body's block scope, so a parameter
        // can be shadowed by a `let` inside the body.
        let inner = self.scopes.push_scope(Some(scope));
        decl.inner_scope = Some(inner);
        for param in &mut decl.params {
            self.extract_param(param, inner);
        }
        if let Some(body) = &mut decl.body {
            self.extract_block(body, inner);
        }
    }

    fn extract_param(&mut self, decl: &mut ParamDecl, scope: anzen_ast::ScopeId) {
        let (symbol, ty_id) = self.declare(decl.name, SymbolKind::Parameter, scope, decl.span);
        decl.scope = Some(scope);
        decl.symbol = Some(symbol);
        decl.ty = Some(ty_id);
    }

    fn extract_prop(&mut self, decl: &mut PropDecl, scope: anzen_ast::ScopeId) {
        // An unconstrained property (no signature, no initializer) isn't a
        // pass-1 error (§4.4): it surfaces downstream, in pass 4, as an
        // ordinary `InferenceError` once nothing ever binds its variable.
        let (symbol, ty_id) = self.declare(decl.name, SymbolKind::Property, scope, decl.span);
        decl.scope = Some(scope);
        decl.symbol = Some(symbol);
        decl.ty = Some(ty_id);
    }

    /// A struct/union/interface (rule 2) is given a `Self` symbol in its
    /// own scope alongside a fresh identity immediately wrapped as a
    /// `TypeAlias` — the concrete `NominalType` isn't assembled until pass 3,
    /// but anything inside the body can already reference the identity.
    fn extract_struct(&mut self, decl: &mut StructDecl, scope: anzen_ast::ScopeId) {
        let (symbol, ty_id) = self.declare(decl.name, SymbolKind::Struct, scope, decl.span);
        decl.scope = Some(scope);
        decl.symbol = Some(symbol);
        decl.ty = Some(ty_id);

        let inner = self.scopes.push_scope(Some(scope));
        decl.inner_scope = Some(inner);
        let self_symbol = self.symbols.declare(anzen_util::symbol::kw_self_type(), SymbolKind::Struct, inner);
        self.scopes.bind(inner, anzen_util::symbol::kw_self_type(), self_symbol);
        self.symbols.set_ty(self_symbol, ty_id);

        for member in &mut decl.members {
            self.extract_decl(member, inner);
        }
    }

    fn extract_union(&mut self, decl: &mut UnionDecl, scope: anzen_ast::ScopeId) {
        let (symbol, ty_id) = self.declare(decl.name, SymbolKind::Union, scope, decl.span);
        decl.scope = Some(scope);
        decl.symbol = Some(symbol);
        decl.ty = Some(ty_id);

        let inner = self.scopes.push_scope(Some(scope));
        decl.inner_scope = Some(inner);
        for case in &mut decl.cases {
            let (case_symbol, case_ty) = self.declare(case.name, SymbolKind::UnionCase, inner, case.span);
            case.scope = Some(inner);
            case.symbol = Some(case_symbol);
            case.ty = Some(case_ty);
        }
    }

    fn extract_interface(&mut self, decl: &mut InterfaceDecl, scope: anzen_ast::ScopeId) {
        let (symbol, ty_id) = self.declare(decl.name, SymbolKind::Interface, scope, decl.span);
        decl.scope = Some(scope);
        decl.symbol = Some(symbol);
        decl.ty = Some(ty_id);

        let inner = self.scopes.push_scope(Some(scope));
        decl.inner_scope = Some(inner);
        for member in &mut decl.members {
            self.extract_decl(member, inner);
        }
    }

    fn extract_block(&mut self, block: &mut Block, parent: anzen_ast::ScopeId) {
        let inner = self.scopes.push_scope(Some(parent));
        block.inner_scope = Some(inner);
        for stmt in &mut block.stmts {
            self.extract_stmt(stmt, inner);
        }
    }

    fn extract_stmt(&mut self, stmt: &mut anzen_ast::Stmt, scope: anzen_ast::ScopeId) {
        use anzen_ast::Stmt;
        match stmt {
            Stmt::Decl(d) => self.extract_decl(d, scope),
            Stmt::If(s) => {
                self.extract_block(&mut s.then_branch, scope);
                if let Some(else_branch) = &mut s.else_branch {
                    self.extract_stmt(else_branch, scope);
                }
            }
            Stmt::While(s) => self.extract_block(&mut s.body, scope),
            Stmt::Brace(b) => self.extract_block(b, scope),
            Stmt::Binding(_) | Stmt::Return(_) | Stmt::Expr(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anzen_ast::builder::*;
    use anzen_ast::Stmt;

    fn new_ctx() -> (ScopeTree, SymbolTable, TypeContext, Handler<AnzenError>) {
        (ScopeTree::new(), SymbolTable::new(), TypeContext::new(), Handler::new())
    }

    #[test]
    fn module_gets_a_scope_child_of_the_builtin_scope() {
        let (mut scopes, mut symbols, mut types, mut handler) = new_ctx();
        let builtin = scopes.push_scope(None);
        let mut m = module(vec![]);
        SymbolExtractor::new(&mut scopes, &mut symbols, &mut types, &mut handler).run(&mut m, Some(builtin));
        assert_eq!(scopes.parent_of(m.inner_scope.unwrap()), Some(builtin));
    }

    #[test]
    fn two_overloaded_functions_do_not_error() {
        let (mut scopes, mut symbols, mut types, mut handler) = new_ctx();
        let mut m = module(vec![
            Decl::Fun(fun_decl("f", vec![], None, vec![])),
            Decl::Fun(fun_decl("f", vec![param("x", ty_sig("Int"))], None, vec![])),
        ]);
        SymbolExtractor::new(&mut scopes, &mut symbols, &mut types, &mut handler).run(&mut m, None);
        assert!(!handler.has_errors());
    }

    #[test]
    fn redeclaring_a_property_is_an_error() {
        let (mut scopes, mut symbols, mut types, mut handler) = new_ctx();
        let mut m = module(vec![
            Decl::Prop(let_decl("x", None, Some(int_lit(1)))),
            Decl::Prop(let_decl("x", None, Some(int_lit(2)))),
        ]);
        SymbolExtractor::new(&mut scopes, &mut symbols, &mut types, &mut handler).run(&mut m, None);
        assert!(handler.has_errors());
    }

    #[test]
    fn property_without_signature_or_initializer_is_not_a_pass_one_error() {
        let (mut scopes, mut symbols, mut types, mut handler) = new_ctx();
        let mut m = module(vec![Decl::Prop(let_decl("x", None, None))]);
        SymbolExtractor::new(&mut scopes, &mut symbols, &mut types, &mut handler).run(&mut m, None);
        assert!(!handler.has_errors());
    }

    #[test]
    fn struct_body_sees_a_self_symbol() {
        let (mut scopes, mut symbols, mut types, mut handler) = new_ctx();
        let mut m = module(vec![Decl::Struct(struct_decl("Pair", vec![Decl::Prop(let_decl("a", Some(ty_sig("Int")), None))]))]);
        SymbolExtractor::new(&mut scopes, &mut symbols, &mut types, &mut handler).run(&mut m, None);
        let Decl::Struct(s) = &m.decls[0] else { panic!() };
        let inner = s.inner_scope.unwrap();
        assert!(!scopes.lookup_local(inner, anzen_util::symbol::kw_self_type()).is_empty());
    }

    #[test]
    fn function_params_and_body_are_in_distinct_scopes() {
        let (mut scopes, mut symbols, mut types, mut handler) = new_ctx();
        let mut m = module(vec![Decl::Fun(fun_decl(
            "f",
            vec![param("x", ty_sig("Int"))],
            None,
            vec![Stmt::Decl(Decl::Prop(let_decl("x", None, Some(int_lit(1)))))],
        ))]);
        SymbolExtractor::new(&mut scopes, &mut symbols, &mut types, &mut handler).run(&mut m, None);
        assert!(!handler.has_errors());
        let Decl::Fun(f) = &m.decls[0] else { panic!() };
        let body_scope = f.body.as_ref().unwrap().inner_scope.unwrap();
        assert_ne!(body_scope, f.inner_scope.unwrap());
    }
}
