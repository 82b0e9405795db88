//! Pass 3: constraint generation (§4.5).
//!
//! Produces a flat list of [`Constraint`]s describing how every fresh type
//! variable this pass mints must relate to the others; pass 4 is the only
//! pass that actually binds a variable to a concrete type. `InfixExpr`/
//! `PrefixExpr` are sugar (§3.1): they never get their own constraint rule,
//! they desugar to a `CallExpr` against the operator token resolved as an
//! ordinary identifier, and the `CallExpr` rule handles the rest.

use anzen_ast::{
    Block, Decl, Expr, FunDecl, FunKind, IfStmt, InterfaceDecl, Module, ParamDecl, PropDecl, ScopeId, Stmt, StructDecl, TypeId, TypeSig,
    TypeSigKind, UnionDecl, WhileStmt,
};
use anzen_util::{symbol, Handler, Span, Symbol};
use indexmap::IndexMap;

use crate::bind::ScopeBinder;
use crate::builtin_contract::BuiltinIds;
use crate::diagnostics::AnzenError;
use crate::qualifier_ty::QualifiedType;
use crate::scope::ScopeTree;
use crate::scope::SymbolTable;
use crate::types::{FunctionType, NominalType, StructType, Type, TypeContext, UnionType};

/// One operand of a constraint: either "whatever `TypeId` ends up bound to"
/// or a type value already known at generation time (a literal's built-in
/// type, the `Error` sentinel, a function/struct shape just assembled).
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Var(TypeId),
    Concrete(Type),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// The two operands denote the same type (§4.1 equality).
    Equal { a: TypeRef, b: TypeRef, span: Span },
    /// `ty` must structurally conform to `interface` (§4.1 conformance):
    /// every member `interface` declares must appear in `ty` with a
    /// compatible type.
    Conforms { ty: TypeRef, interface: TypeRef, span: Span },
    /// `ty` must be an instance of the generic shape `pattern`, growing a
    /// placeholder→type mapping as it goes (§4.1 specialization).
    Specializes { ty: TypeRef, pattern: TypeRef, span: Span },
    /// `owner` must have a member named `name`, and `result` is that
    /// member's type (§4.6 `find_member`).
    Member { owner: TypeRef, name: Symbol, result: TypeRef, span: Span },
    /// Exactly one alternative's constraint list must hold (§4.6 overload
    /// resolution backtracking).
    Disjunction { alternatives: Vec<Vec<Constraint>>, span: Span },
}

pub struct ConstraintGenerator<'a> {
    pub scopes: &'a ScopeTree,
    pub symbols: &'a SymbolTable,
    pub types: &'a mut TypeContext,
    pub builtins: &'a BuiltinIds,
    pub handler: &'a mut Handler<AnzenError>,
    constraints: Vec<Constraint>,
    return_ty_stack: Vec<TypeId>,
}

impl<'a> ConstraintGenerator<'a> {
    pub fn new(scopes: &'a ScopeTree, symbols: &'a SymbolTable, types: &'a mut TypeContext, builtins: &'a BuiltinIds, handler: &'a mut Handler<AnzenError>) -> Self {
        ConstraintGenerator { scopes, symbols, types, builtins, handler, constraints: Vec::new(), return_ty_stack: Vec::new() }
    }

    pub fn run(mut self, module: &mut Module) -> Vec<Constraint> {
        debug_assert!(module.state.precedes(anzen_ast::ModuleState::ConstraintsGenerated));
        tracing::debug!("pass 3 (constraint generation) entered");
        for decl in &mut module.decls {
            self.generate_decl(decl);
        }
        module.state = anzen_ast::ModuleState::ConstraintsGenerated;
        tracing::debug!(constraints = self.constraints.len(), "pass 3 (constraint generation) exited");
        self.constraints
    }

    fn push(&mut self, c: Constraint) {
        self.constraints.push(c);
    }

    fn equal(&mut self, a: TypeId, b: TypeId, span: Span) {
        self.push(Constraint::Equal { a: TypeRef::Var(a), b: TypeRef::Var(b), span });
    }

    fn equal_concrete(&mut self, a: TypeId, b: Type, span: Span) {
        self.push(Constraint::Equal { a: TypeRef::Var(a), b: TypeRef::Concrete(b), span });
    }

    fn builtin_alias(&self, id: TypeId, name: &str) -> Type {
        Type::Alias { name: Symbol::intern(name), id }
    }

    // ---- declarations ---------------------------------------------------

    fn generate_decl(&mut self, decl: &mut Decl) {
        match decl {
            Decl::Fun(d) => self.generate_fun(d),
            Decl::Prop(d) => self.generate_prop(d),
            Decl::Struct(d) => self.generate_struct(d),
            Decl::Union(d) => self.generate_union(d),
            Decl::Interface(d) => self.generate_interface(d),
            Decl::TypeExt(d) => {
                for member in &mut d.members {
                    self.generate_decl(member);
                }
            }
        }
    }

    fn generate_fun(&mut self, decl: &mut FunDecl) {
        let fun_ty = decl.ty.expect("pass 1 must run before pass 3");

        for param in &mut decl.params {
            self.generate_param(param);
        }

        let codomain_ty = match &mut decl.codomain {
            Some(sig) => self.generate_type_sig(sig),
            None => {
                let id = self.types.fresh_id();
                self.equal_concrete(id, self.builtin_alias(self.builtins.nothing, "Nothing"), decl.span);
                id
            }
        };

        let shape = Type::Function(FunctionType {
            placeholders: decl.placeholders.clone(),
            params: decl
                .params
                .iter()
                .map(|p| (p.label, QualifiedType { qualifiers: p.qualifiers, ty: Type::Var(p.ty.expect("pass 1 ran")) }))
                .collect(),
            codomain: Box::new(QualifiedType::unqualified(Type::Var(codomain_ty))),
        });
        self.equal_concrete(fun_ty, shape, decl.span);

        if let Some(body) = &mut decl.body {
            self.return_ty_stack.push(codomain_ty);
            self.generate_block(body);
            self.return_ty_stack.pop();
        }
    }

    fn generate_param(&mut self, decl: &mut ParamDecl) {
        let param_ty = decl.ty.expect("pass 1 must run before pass 3");
        let sig_ty = self.generate_type_sig(&mut decl.signature);
        self.equal(param_ty, sig_ty, decl.span);
        if let Some(default) = &mut decl.default {
            let default_ty = self.generate_expr(default);
            self.equal(param_ty, default_ty, decl.span);
        }
    }

    fn generate_prop(&mut self, decl: &mut PropDecl) {
        let prop_ty = decl.ty.expect("pass 1 must run before pass 3");
        let mut saw_source = false;
        if let Some(sig) = &mut decl.signature {
            let sig_ty = self.generate_type_sig(sig);
            self.equal(prop_ty, sig_ty, decl.span);
            saw_source = true;
        }
        if let Some((_, init)) = &mut decl.init {
            let init_ty = self.generate_expr(init);
            self.equal(prop_ty, init_ty, decl.span);
            saw_source = true;
        }
        if !saw_source {
            self.equal_concrete(prop_ty, Type::Error, decl.span);
        }
    }

    fn generate_struct(&mut self, decl: &mut StructDecl) {
        let struct_ty = decl.ty.expect("pass 1 must run before pass 3");
        for member in &mut decl.members {
            self.generate_decl(member);
        }
        let mut properties = IndexMap::new();
        let mut methods: IndexMap<Symbol, Vec<FunctionType>> = IndexMap::new();
        for member in &decl.members {
            match member {
                Decl::Prop(p) => {
                    properties.insert(p.name, QualifiedType::unqualified(Type::Var(p.ty.expect("pass 1 ran"))));
                }
                Decl::Fun(f) => {
                    // `f.ty` is the method's *own* variable (bound to this
                    // whole `FunctionType` by `generate_fun`'s own equality
                    // constraint) — not its codomain. The codomain variable
                    // is the signature's, or a fresh one defaulting to
                    // `Nothing` when there's no explicit annotation, exactly
                    // as `generate_fun` computes it for the same declaration.
                    let codomain_ty = match &f.codomain {
                        Some(sig) => sig.ty.expect("codomain signature generated above"),
                        None => {
                            let id = self.types.fresh_id();
                            self.equal_concrete(id, self.builtin_alias(self.builtins.nothing, "Nothing"), f.span);
                            id
                        }
                    };
                    let shape = FunctionType {
                        placeholders: f.placeholders.clone(),
                        params: f.params.iter().map(|p| (p.label, QualifiedType { qualifiers: p.qualifiers, ty: Type::Var(p.ty.expect("pass 1 ran")) })).collect(),
                        codomain: Box::new(QualifiedType::unqualified(Type::Var(codomain_ty))),
                    };
                    // A constructor is registered under `__new__` regardless
                    // of its declared name, so `find_member`'s rule 5 (§4.6)
                    // can find every initializer the same way no matter how
                    // the surface syntax spells it.
                    let key = if f.kind == FunKind::Constructor { symbol::kw_new() } else { f.name };
                    methods.entry(key).or_default().push(shape);
                }
                _ => {}
            }
        }
        self.types.define_nominal(NominalType::Struct(StructType {
            name: decl.name,
            id: struct_ty,
            placeholders: decl.placeholders.clone(),
            properties,
            methods,
        }));
        // The struct's own identity doubles as its type variable (§4.3
        // rule 2); bind it to its own alias so `deref` terminates on it.
        self.types.bind(struct_ty, Type::Alias { name: decl.name, id: struct_ty });
    }

    fn generate_union(&mut self, decl: &mut UnionDecl) {
        let union_ty = decl.ty.expect("pass 1 must run before pass 3");
        let mut cases = IndexMap::new();
        for case in &mut decl.cases {
            let payload = match &mut case.signature {
                Some(sig) => {
                    let sig_ty = self.generate_type_sig(sig);
                    if let Some(case_ty) = case.ty {
                        self.equal(case_ty, sig_ty, case.span);
                    }
                    Some(QualifiedType::unqualified(Type::Var(sig_ty)))
                }
                None => None,
            };
            cases.insert(case.name, payload);
        }
        self.types.define_nominal(NominalType::Union(UnionType { name: decl.name, id: union_ty, placeholders: decl.placeholders.clone(), cases }));
        self.types.bind(union_ty, Type::Alias { name: decl.name, id: union_ty });
    }

    fn generate_interface(&mut self, decl: &mut InterfaceDecl) {
        let interface_ty = decl.ty.expect("pass 1 must run before pass 3");
        let mut members = IndexMap::new();
        for member in &decl.members {
            if let Decl::Prop(p) = member {
                members.insert(p.name, QualifiedType::unqualified(Type::Var(p.ty.expect("pass 1 ran"))));
            }
        }
        self.types.define_nominal(NominalType::Interface(crate::types::InterfaceType {
            name: decl.name,
            id: interface_ty,
            placeholders: decl.placeholders.clone(),
            members,
        }));
        self.types.bind(interface_ty, Type::Alias { name: decl.name, id: interface_ty });
    }

    fn generate_type_sig(&mut self, sig: &mut TypeSig) -> TypeId {
        let id = self.types.fresh_id();
        sig.ty = Some(id);
        match &mut sig.kind {
            TypeSigKind::Named { name, scope, spec_args } => {
                for arg in spec_args.iter_mut() {
                    self.generate_type_sig(arg);
                }
                let candidate = scope.and_then(|s| self.scopes.lookup_local(s, *name).first().copied());
                match candidate {
                    Some(sym) => {
                        let symbol = self.symbols.get(sym);
                        if symbol.kind.is_type_introducing() {
                            let sym_ty = symbol.ty.expect("declared symbols always carry a type id");
                            self.equal(id, sym_ty, sig.span);
                        } else {
                            // `name` resolves to a value, not a type: its own
                            // type isn't `Metatype<_>` (§3.2), so it can't
                            // denote a type here (§7 `InvalidTypeIdentifier`).
                            self.handler.emit(AnzenError::InvalidTypeIdentifier { name: *name, span: sig.span });
                            self.equal_concrete(id, Type::Error, sig.span);
                        }
                    }
                    None => self.equal_concrete(id, Type::Error, sig.span),
                }
            }
            TypeSigKind::Qualified { inner, .. } => {
                let inner_ty = self.generate_type_sig(inner);
                self.equal(id, inner_ty, sig.span);
            }
        }
        id
    }

    // ---- statements -------------------------------------------------------

    fn generate_block(&mut self, block: &mut Block) {
        for stmt in &mut block.stmts {
            self.generate_stmt(stmt);
        }
    }

    fn generate_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Decl(d) => self.generate_decl(d),
            Stmt::Binding(b) => {
                let lhs = self.generate_expr(&mut b.lvalue);
                let rhs = self.generate_expr(&mut b.rvalue);
                self.equal(lhs, rhs, b.span);
            }
            Stmt::Return(r) => {
                if let Some(value) = &mut r.value {
                    let value_ty = self.generate_expr(value);
                    if let Some(&codomain) = self.return_ty_stack.last() {
                        self.equal(value_ty, codomain, r.span);
                    }
                }
            }
            Stmt::If(s) => self.generate_if(s),
            Stmt::While(s) => self.generate_while(s),
            Stmt::Brace(b) => self.generate_block(b),
            Stmt::Expr(e) => {
                self.generate_expr(e);
            }
        }
    }

    fn generate_if(&mut self, stmt: &mut IfStmt) {
        let cond_ty = self.generate_expr(&mut stmt.cond);
        self.equal_concrete(cond_ty, self.builtin_alias(self.builtins.bool_, "Bool"), stmt.span);
        self.generate_block(&mut stmt.then_branch);
        if let Some(else_branch) = &mut stmt.else_branch {
            self.generate_stmt(else_branch);
        }
    }

    fn generate_while(&mut self, stmt: &mut WhileStmt) {
        let cond_ty = self.generate_expr(&mut stmt.cond);
        self.equal_concrete(cond_ty, self.builtin_alias(self.builtins.bool_, "Bool"), stmt.span);
        self.generate_block(&mut stmt.body);
    }

    // ---- expressions --------------------------------------------------

    fn generate_expr(&mut self, expr: &mut Expr) -> TypeId {
        match expr {
            Expr::Ident(e) => {
                let id = self.types.fresh_id();
                e.ty = Some(id);
                match e.scope {
                    Some(scope) => self.generate_ident_candidates(id, scope, e.name, e.span),
                    None => self.equal_concrete(id, Type::Error, e.span),
                }
                id
            }
            Expr::Select(e) => {
                let owner_ty = self.generate_expr(&mut e.owner);
                let id = self.types.fresh_id();
                e.ty = Some(id);
                self.push(Constraint::Member { owner: TypeRef::Var(owner_ty), name: e.ownee, result: TypeRef::Var(id), span: e.span });
                id
            }
            Expr::ImplicitSelect(e) => {
                let id = self.types.fresh_id();
                e.ty = Some(id);
                // Owner is the enclosing `Self`; `assign.rs` resolves it
                // once the owner's concrete nominal type is known.
                id
            }
            Expr::Call(e) => {
                let id = self.types.fresh_id();
                e.ty = Some(id);
                let params = e
                    .args
                    .iter_mut()
                    .map(|arg| (arg.label, QualifiedType::unqualified(Type::Var(self.generate_expr(&mut arg.value)))))
                    .collect();
                let shape = Type::Function(FunctionType { placeholders: Vec::new(), params, codomain: Box::new(QualifiedType::unqualified(Type::Var(id))) });
                match e.callee.as_mut() {
                    Expr::Ident(callee) => {
                        let callee_ty = self.types.fresh_id();
                        callee.ty = Some(callee_ty);
                        self.equal_concrete(callee_ty, shape.clone(), e.span);
                        self.constrain_overload_set(callee.scope, callee.name, callee.span, shape);
                    }
                    other => {
                        let callee_ty = self.generate_expr(other);
                        self.equal_concrete(callee_ty, shape, e.span);
                    }
                }
                id
            }
            Expr::BoolLit { ty, span, .. } => self.literal(ty, *span, self.builtins.bool_, "Bool"),
            Expr::IntLit { ty, span, .. } => self.literal(ty, *span, self.builtins.int, "Int"),
            Expr::FloatLit { ty, span, .. } => self.literal(ty, *span, self.builtins.float, "Float"),
            Expr::StringLit { ty, span, .. } => self.literal(ty, *span, self.builtins.string, "String"),
            Expr::Infix(e) => {
                // Desugar to `op(lhs, rhs)` resolved through the identifier
                // machinery (§3.1, §4.5): the operator is just another name,
                // and which overload wins is decided jointly with the
                // operand shapes, not independently of them.
                let lhs_ty = self.generate_expr(&mut e.lhs);
                let rhs_ty = self.generate_expr(&mut e.rhs);
                let id = self.types.fresh_id();
                e.ty = Some(id);
                let shape = Type::Function(FunctionType {
                    placeholders: Vec::new(),
                    params: vec![(None, QualifiedType::unqualified(Type::Var(lhs_ty))), (None, QualifiedType::unqualified(Type::Var(rhs_ty)))],
                    codomain: Box::new(QualifiedType::unqualified(Type::Var(id))),
                });
                let op_scope = self.resolve_operator_scope(e.op, e.op_span);
                self.constrain_overload_set(op_scope, e.op, e.op_span, shape);
                id
            }
            Expr::Prefix(e) => {
                let operand_ty = self.generate_expr(&mut e.operand);
                let id = self.types.fresh_id();
                e.ty = Some(id);
                let shape = Type::Function(FunctionType {
                    placeholders: Vec::new(),
                    params: vec![(None, QualifiedType::unqualified(Type::Var(operand_ty)))],
                    codomain: Box::new(QualifiedType::unqualified(Type::Var(id))),
                });
                let op_scope = self.resolve_operator_scope(e.op, e.op_span);
                self.constrain_overload_set(op_scope, e.op, e.op_span, shape);
                id
            }
            Expr::Paren { inner, ty, .. } => {
                let inner_ty = self.generate_expr(inner);
                *ty = Some(inner_ty);
                inner_ty
            }
            Expr::Lambda(e) => {
                for param in &mut e.params {
                    self.generate_param(param);
                }
                let codomain_ty = match &mut e.codomain {
                    Some(sig) => self.generate_type_sig(sig),
                    None => self.types.fresh_id(),
                };
                self.return_ty_stack.push(codomain_ty);
                self.generate_block(&mut e.body);
                self.return_ty_stack.pop();
                let id = self.types.fresh_id();
                e.ty = Some(id);
                let shape = Type::Function(FunctionType {
                    placeholders: Vec::new(),
                    params: e.params.iter().map(|p| (p.label, QualifiedType { qualifiers: p.qualifiers, ty: Type::Var(p.ty.expect("pass 1 ran")) })).collect(),
                    codomain: Box::new(QualifiedType::unqualified(Type::Var(codomain_ty))),
                });
                self.equal_concrete(id, shape, e.span);
                id
            }
            Expr::ArrayLit { elements, ty, span, .. } | Expr::SetLit { elements, ty, span, .. } => {
                let id = self.types.fresh_id();
                *ty = Some(id);
                let mut element_tys = Vec::new();
                for element in elements.iter_mut() {
                    element_tys.push(self.generate_expr(element));
                }
                for pair in element_tys.windows(2) {
                    self.equal(pair[0], pair[1], *span);
                }
                id
            }
            Expr::MapLit { entries, ty, span, .. } => {
                let id = self.types.fresh_id();
                *ty = Some(id);
                let mut key_tys = Vec::new();
                let mut value_tys = Vec::new();
                for (k, v) in entries.iter_mut() {
                    key_tys.push(self.generate_expr(k));
                    value_tys.push(self.generate_expr(v));
                }
                for pair in key_tys.windows(2) {
                    self.equal(pair[0], pair[1], *span);
                }
                for pair in value_tys.windows(2) {
                    self.equal(pair[0], pair[1], *span);
                }
                id
            }
            Expr::UnsafeCast { expr, target, ty, .. } => {
                self.generate_expr(expr);
                let target_ty = self.generate_type_sig(target);
                *ty = Some(target_ty);
                target_ty
            }
        }
    }

    fn literal(&mut self, slot: &mut Option<TypeId>, span: Span, builtin: TypeId, name: &str) -> TypeId {
        let id = self.types.fresh_id();
        *slot = Some(id);
        self.equal_concrete(id, self.builtin_alias(builtin, name), span);
        id
    }

    /// The overload set an `Ident` (or the synthetic identifier an operator
    /// desugars to) must resolve against: a single candidate is a direct
    /// equality, more than one becomes a disjunction the solver picks among
    /// (§4.5, §4.6).
    fn generate_ident_candidates(&mut self, id: TypeId, scope: ScopeId, name: Symbol, span: Span) {
        let candidates = self.scopes.lookup_local(scope, name);
        match candidates.len() {
            0 => self.equal_concrete(id, Type::Error, span),
            1 => {
                let symbol = self.symbols.get(candidates[0]);
                let sym_ty = symbol.ty.expect("declared symbols always carry a type id");
                if symbol.kind.is_type_introducing() {
                    // `name` names a type, not a value: as a bare expression
                    // it has type `Metatype<name>` (§3.2's canonical
                    // example), not `name` itself. A constructor *call*
                    // never reaches this path — `Call`'s own `Ident` callee
                    // handling resolves the callee directly against the
                    // built call shape instead.
                    self.equal_concrete(id, Type::Metatype(Box::new(Type::Var(sym_ty))), span);
                } else {
                    self.equal(id, sym_ty, span);
                }
            }
            _ => {
                let alternatives = candidates
                    .iter()
                    .map(|&candidate| {
                        let sym_ty = self.symbols.get(candidate).ty.expect("declared symbols always carry a type id");
                        vec![Constraint::Equal { a: TypeRef::Var(id), b: TypeRef::Var(sym_ty), span }]
                    })
                    .collect();
                self.push(Constraint::Disjunction { alternatives, span });
            }
        }
    }

    /// Constrains every symbol bound under `name` in `scope` against `shape`
    /// directly — used at call sites and operator desugarings (§4.5, §4.6),
    /// where which overload is chosen and whether the arguments fit it are
    /// the same decision, not two independent ones. A lone candidate is
    /// equated directly; more than one becomes a disjunction so a
    /// structural mismatch on a non-chosen overload rolls back instead of
    /// reporting a spurious error.
    fn constrain_overload_set(&mut self, scope: Option<ScopeId>, name: Symbol, span: Span, shape: Type) {
        let Some(scope) = scope else { return };
        let candidates = self.scopes.lookup_local(scope, name).to_vec();
        match candidates.len() {
            0 => {}
            1 => {
                let sym_ty = self.symbols.get(candidates[0]).ty.expect("declared symbols always carry a type id");
                self.equal_concrete(sym_ty, shape, span);
            }
            _ => {
                let alternatives = candidates
                    .iter()
                    .map(|&candidate| {
                        let sym_ty = self.symbols.get(candidate).ty.expect("declared symbols always carry a type id");
                        vec![Constraint::Equal { a: TypeRef::Var(sym_ty), b: TypeRef::Concrete(shape.clone()), span }]
                    })
                    .collect();
                self.push(Constraint::Disjunction { alternatives, span });
            }
        }
    }

    /// Operators are ordinary overloadable identifiers (§3.1): the operator
    /// token is looked up the same way the scope binder resolves any other
    /// name, reusing its resolution helper directly.
    fn resolve_operator_scope(&mut self, op: Symbol, span: Span) -> Option<ScopeId> {
        let root = self.root_scope();
        let mut binder = ScopeBinder::new(self.scopes, self.handler);
        // Operators are always defined at (or above) the built-in scope, so
        // starting the search from the deepest scope this generator knows
        // about isn't available here; instead the caller already resolved
        // identifier scopes during pass 2, and the built-in scope — the
        // root of every chain — is where operators live, so walking from
        // any scope reaches it.
        binder.resolve(root, op, None, span)
    }

    fn root_scope(&self) -> ScopeId {
        let mut current = ScopeId(0);
        while let Some(parent) = self.scopes.parent_of(current) {
            current = parent;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::ScopeBinder;
    use crate::builtin_contract::register_minimal;
    use crate::extract::SymbolExtractor;
    use anzen_ast::builder::*;
    use anzen_ast::Decl;

    fn run_passes(mut m: Module) -> (Module, TypeContext, BuiltinIds, Vec<Constraint>) {
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let mut types = TypeContext::new();
        let mut handler = Handler::new();
        let (builtin_scope, builtins) = register_minimal(&mut types, &mut scopes, &mut symbols);
        SymbolExtractor::new(&mut scopes, &mut symbols, &mut types, &mut handler).run(&mut m, Some(builtin_scope));
        ScopeBinder::new(&scopes, &mut handler).run(&mut m);
        let constraints = ConstraintGenerator::new(&scopes, &symbols, &mut types, &builtins, &mut handler).run(&mut m);
        (m, types, builtins, constraints)
    }

    #[test]
    fn int_literal_equates_to_the_int_alias() {
        let m = module(vec![Decl::Prop(let_decl("x", None, Some(int_lit(1))))]);
        let (_, _types, builtins, constraints) = run_passes(m);
        let found = constraints.iter().any(|c| matches!(
            c,
            Constraint::Equal { b: TypeRef::Concrete(Type::Alias { id, .. }), .. } if *id == builtins.int
        ));
        assert!(found, "expected an Equal constraint against the Int alias: {constraints:?}");
    }

    #[test]
    fn function_without_codomain_equates_to_nothing() {
        let m = module(vec![Decl::Fun(fun_decl("f", vec![], None, vec![]))]);
        let (_, _types, builtins, constraints) = run_passes(m);
        let found = constraints.iter().any(|c| matches!(
            c,
            Constraint::Equal { b: TypeRef::Concrete(Type::Alias { id, .. }), .. } if *id == builtins.nothing
        ));
        assert!(found, "expected the implicit codomain to equate to Nothing: {constraints:?}");
    }

    #[test]
    fn function_signature_produces_a_function_shape_constraint() {
        let m = module(vec![Decl::Fun(fun_decl("f", vec![param("n", ty_sig("Int"))], Some(ty_sig("Int")), vec![]))]);
        let (_, _types, _builtins, constraints) = run_passes(m);
        let found = constraints.iter().any(|c| matches!(c, Constraint::Equal { b: TypeRef::Concrete(Type::Function(_)), .. }));
        assert!(found, "expected the function's own type to equate to a FunctionType shape: {constraints:?}");
    }

    #[test]
    fn call_expression_builds_a_function_shape_from_its_arguments() {
        let m = module(vec![
            Decl::Fun(fun_decl("f", vec![param("n", ty_sig("Int"))], Some(ty_sig("Int")), vec![])),
            Decl::Prop(let_decl("y", None, Some(call(ident("f"), vec![int_lit(1)])))),
        ]);
        let (_, _types, _builtins, constraints) = run_passes(m);
        let found = constraints.iter().any(|c| matches!(
            c,
            Constraint::Equal { b: TypeRef::Concrete(Type::Function(shape)), .. } if shape.params.len() == 1
        ));
        assert!(found, "expected a one-parameter function shape for the call site: {constraints:?}");
    }

    #[test]
    fn unresolved_type_name_becomes_the_error_sentinel() {
        let m = module(vec![Decl::Prop(let_decl("x", Some(ty_sig("Nope")), None))]);
        let (_, _types, _builtins, constraints) = run_passes(m);
        let found = constraints.iter().any(|c| matches!(c, Constraint::Equal { b: TypeRef::Concrete(Type::Error), .. }));
        assert!(found, "expected the unresolved type name to equate to Type::Error: {constraints:?}");
    }

    #[test]
    fn overloaded_identifier_becomes_a_disjunction() {
        let m = module(vec![
            Decl::Fun(fun_decl("f", vec![], None, vec![])),
            Decl::Fun(fun_decl("f", vec![param("n", ty_sig("Int"))], None, vec![])),
            Decl::Prop(let_decl("y", None, Some(ident("f")))),
        ]);
        let (_, _types, _builtins, constraints) = run_passes(m);
        let found = constraints.iter().any(|c| matches!(c, Constraint::Disjunction { alternatives, .. } if alternatives.len() == 2));
        assert!(found, "expected a two-way disjunction over the overload set: {constraints:?}");
    }

    #[test]
    fn referencing_a_value_as_a_type_is_invalid_type_identifier() {
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let mut types = TypeContext::new();
        let mut handler = Handler::new();
        let (builtin_scope, builtins) = register_minimal(&mut types, &mut scopes, &mut symbols);
        let mut m = module(vec![
            Decl::Prop(let_decl("x", None, Some(int_lit(1)))),
            Decl::Prop(let_decl("y", Some(ty_sig("x")), None)),
        ]);
        SymbolExtractor::new(&mut scopes, &mut symbols, &mut types, &mut handler).run(&mut m, Some(builtin_scope));
        ScopeBinder::new(&scopes, &mut handler).run(&mut m);
        ConstraintGenerator::new(&scopes, &symbols, &mut types, &builtins, &mut handler).run(&mut m);
        assert!(handler.diagnostics().iter().any(|e| matches!(e, AnzenError::InvalidTypeIdentifier { .. })));
    }

    #[test]
    fn a_bare_struct_name_used_as_a_value_has_metatype() {
        let m = module(vec![
            Decl::Struct(struct_decl("Pair", vec![])),
            Decl::Prop(let_decl("t", None, Some(ident("Pair")))),
        ]);
        let (_, _types, _builtins, constraints) = run_passes(m);
        let found = constraints.iter().any(|c| matches!(c, Constraint::Equal { b: TypeRef::Concrete(Type::Metatype(_)), .. }));
        assert!(found, "expected the bare struct name to equate to a Metatype: {constraints:?}");
    }

    #[test]
    fn struct_properties_are_assembled_into_a_nominal_type() {
        let m = module(vec![Decl::Struct(struct_decl("Pair", vec![
            Decl::Prop(let_decl("a", Some(ty_sig("Int")), None)),
            Decl::Prop(let_decl("b", Some(ty_sig("Int")), None)),
        ]))]);
        let (m, types, _builtins, _constraints) = run_passes(m);
        let Decl::Struct(s) = &m.decls[0] else { panic!() };
        let nominal = types.nominal(s.ty.unwrap()).expect("struct should be registered as a nominal type");
        match nominal {
            NominalType::Struct(st) => assert_eq!(st.properties.len(), 2),
            _ => panic!("expected a struct"),
        }
    }
}
