//! Pass 4: constraint solving (§4.6).
//!
//! Processes the flat constraint list `constrain.rs` produced. Most
//! constraints unify immediately; a `Disjunction` (an overloaded identifier
//! or operator) tries every alternative against the same snapshot of the
//! substitution map and only then decides — one clean alternative commits
//! it, none is an `InferenceError`, more than one is `AmbiguousType` (§8
//! I8). This language never nests more than one unresolved overload inside
//! another at the same call site, so there's no need for a deeper search
//! than one level of exhaustive trial.

use std::collections::HashMap;

use anzen_ast::TypeId;
use anzen_util::{Handler, Span, Symbol};

use crate::constrain::{Constraint, TypeRef};
use crate::diagnostics::AnzenError;
use crate::qualifier_ty::QualifiedType;
use crate::types::{self, FunctionType, NominalType, Type, TypeContext};

/// Tunables for pass 4, grouped so the embedding driver can override them
/// without the core reaching for environment variables or a config file
/// (§10) — the core itself only ever constructs the `Default`.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Hard cap on how many times a constraint (or a disjunction trial) may
    /// be deferred before the solver gives up on it as unsolvable. A
    /// correctly-generated constraint list never needs more than a handful
    /// of passes to reach a fixed point; this is a fairness backstop, not a
    /// tuning knob most callers should ever touch.
    pub max_passes: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig { max_passes: 64 }
    }
}

pub struct Solver<'a> {
    ctx: &'a mut TypeContext,
    handler: &'a mut Handler<AnzenError>,
    config: SolverConfig,
}

impl<'a> Solver<'a> {
    pub fn new(ctx: &'a mut TypeContext, handler: &'a mut Handler<AnzenError>) -> Self {
        Solver { ctx, handler, config: SolverConfig::default() }
    }

    pub fn with_config(ctx: &'a mut TypeContext, handler: &'a mut Handler<AnzenError>, config: SolverConfig) -> Self {
        Solver { ctx, handler, config }
    }

    /// Runs every constraint to a fixed point, emitting diagnostics for any
    /// that remain unsatisfiable.
    pub fn run(&mut self, constraints: Vec<Constraint>) {
        tracing::debug!(constraints = constraints.len(), "pass 4 (constraint solving) entered");
        let mut queue: Vec<Constraint> = constraints;
        for pass in 0..self.config.max_passes {
            if queue.is_empty() {
                break;
            }
            let mut next = Vec::new();
            let mut made_progress = false;
            for c in queue {
                if self.solve_one(&c) {
                    made_progress = true;
                } else {
                    next.push(c);
                }
            }
            tracing::trace!(pass, remaining = next.len(), made_progress, "pass 4 fixed-point iteration");
            queue = next;
            if !made_progress {
                break;
            }
        }
        for c in &queue {
            self.handler.emit(AnzenError::InferenceError { span: constraint_span(c) });
        }
        tracing::debug!(unsolved = queue.len(), "pass 4 (constraint solving) exited");
    }

    fn resolve(&self, r: &TypeRef) -> Type {
        match r {
            TypeRef::Var(id) => types::deref(self.ctx, &Type::Var(*id)).clone(),
            TypeRef::Concrete(ty) => types::deref(self.ctx, ty).clone(),
        }
    }

    /// Attempts to satisfy one constraint now. Returns `false` if it should
    /// be deferred (an operand is still an unbound variable this pass hasn't
    /// reached yet).
    fn solve_one(&mut self, c: &Constraint) -> bool {
        match c {
            Constraint::Equal { a, b, span } => {
                let ta = self.resolve(a);
                let tb = self.resolve(b);
                self.unify(&ta, &tb, *span)
            }
            Constraint::Conforms { ty, interface, span } => {
                let t = self.resolve(ty);
                let i = self.resolve(interface);
                self.check_conforms(&t, &i, *span)
            }
            Constraint::Specializes { ty, pattern, span } => {
                let t = self.resolve(ty);
                let p = self.resolve(pattern);
                let mut mapping = HashMap::new();
                if types::pattern_specialize(&t, &p, &mut mapping).is_some() {
                    true
                } else {
                    self.handler.emit(AnzenError::InferenceError { span: *span });
                    true
                }
            }
            Constraint::Member { owner, name, result, span } => self.solve_member(owner, *name, result, *span),
            Constraint::Disjunction { alternatives, span } => self.solve_disjunction(alternatives, *span),
        }
    }

    fn unify(&mut self, a: &Type, b: &Type, span: Span) -> bool {
        match (a, b) {
            (Type::Error, _) | (_, Type::Error) => true,
            (Type::Var(x), Type::Var(y)) if x == y => true,
            (Type::Var(x), _) => {
                self.ctx.bind(*x, b.clone());
                true
            }
            (_, Type::Var(y)) => {
                self.ctx.bind(*y, a.clone());
                true
            }
            (Type::Placeholder { id: x, .. }, Type::Placeholder { id: y, .. }) => x == y,
            (Type::SelfType(x), Type::SelfType(y)) => x == y,
            (Type::Metatype(x), Type::Metatype(y)) => self.unify(x, y, span),
            (Type::Function(f1), Type::Function(f2)) => self.unify_function(f1, f2, span),
            (Type::Alias { .. }, Type::Alias { .. }) => {
                if types::types_equal(self.ctx, a, b) {
                    true
                } else {
                    self.handler.emit(AnzenError::InferenceError { span });
                    true
                }
            }
            (Type::Alias { .. }, Type::Function(f)) => self.unify_constructor_call(a, f, span),
            (Type::Function(f), Type::Alias { .. }) => self.unify_constructor_call(b, f, span),
            _ => {
                self.handler.emit(AnzenError::InferenceError { span });
                true
            }
        }
    }

    /// Rule 5 (§4.6): a call against a type alias is a constructor call.
    /// Looks up every `__new__` overload the struct behind `alias` declares
    /// and resolves which one the call's argument shape matches the same
    /// way an overloaded identifier would (§4.6 member lookup, backtracking
    /// identical to [`Self::solve_disjunction`]).
    fn unify_constructor_call(&mut self, alias: &Type, call_shape: &FunctionType, span: Span) -> bool {
        let Type::Alias { id, name } = alias else { unreachable!("caller matched on Type::Alias") };
        let overloads = match self.ctx.nominal(*id) {
            Some(NominalType::Struct(s)) => s.methods.get(&anzen_util::symbol::kw_new()).cloned().unwrap_or_default(),
            _ => Vec::new(),
        };
        match overloads.len() {
            0 => {
                self.handler.emit(AnzenError::NoInitializer { name: *name, span });
                true
            }
            1 => self.unify_function(call_shape, &overloads[0], span),
            _ => {
                let base_snapshot = self.ctx.snapshot_substitutions();
                let base_errors = self.handler.error_count();
                let mut successes = Vec::new();
                for (overload_index, overload) in overloads.iter().enumerate() {
                    let clean = self.unify_function(call_shape, overload, span) && self.handler.error_count() == base_errors;
                    tracing::trace!(overload_index, clean, "constructor overload trial");
                    if clean {
                        successes.push(self.ctx.snapshot_substitutions());
                    }
                    self.ctx.restore_substitutions(base_snapshot.clone());
                    self.handler.truncate(base_errors);
                }
                match successes.len() {
                    1 => {
                        self.ctx.restore_substitutions(successes.into_iter().next().expect("len checked above"));
                        true
                    }
                    0 => {
                        self.handler.emit(AnzenError::InferenceError { span });
                        true
                    }
                    _ => {
                        self.handler.emit(AnzenError::AmbiguousType { span, candidate_count: overloads.len() });
                        true
                    }
                }
            }
        }
    }

    fn unify_function(&mut self, f1: &FunctionType, f2: &FunctionType, span: Span) -> bool {
        if f1.params.len() != f2.params.len() {
            self.handler.emit(AnzenError::InferenceError { span });
            return true;
        }
        let params: Vec<((Option<Symbol>, QualifiedType), (Option<Symbol>, QualifiedType))> =
            f1.params.iter().cloned().zip(f2.params.iter().cloned()).collect();
        for ((_, q1), (_, q2)) in params {
            self.unify_qualified(&q1, &q2, span);
        }
        let codomain = (f1.codomain.as_ref().clone(), f2.codomain.as_ref().clone());
        self.unify_qualified(&codomain.0, &codomain.1, span);
        true
    }

    fn unify_qualified(&mut self, a: &QualifiedType, b: &QualifiedType, span: Span) {
        if !a.qualifiers.is_empty() && !b.qualifiers.is_empty() && a.qualifiers != b.qualifiers {
            self.handler.emit(AnzenError::IncompatibleQualifiers { span });
        }
        let ta = types::deref(self.ctx, &a.ty).clone();
        let tb = types::deref(self.ctx, &b.ty).clone();
        self.unify(&ta, &tb, span);
    }

    /// Structural conformance: every member `interface` declares must exist
    /// on `ty` with a compatible type (§4.1).
    fn check_conforms(&mut self, ty: &Type, interface: &Type, span: Span) -> bool {
        let Type::Alias { id: iface_id, .. } = interface else { return true };
        let Some(NominalType::Interface(iface)) = self.ctx.nominal(*iface_id).cloned() else { return true };
        for (name, member_ty) in &iface.members {
            match self.find_member(ty, *name) {
                Some(found) => {
                    let found = types::deref(self.ctx, &found).clone();
                    let expected = types::deref(self.ctx, &member_ty.ty).clone();
                    if !types::types_equal(self.ctx, &found, &expected) {
                        self.handler.emit(AnzenError::InferenceError { span });
                    }
                }
                None => self.handler.emit(AnzenError::NoMember { name: *name, span }),
            }
        }
        true
    }

    fn solve_member(&mut self, owner: &TypeRef, name: Symbol, result: &TypeRef, span: Span) -> bool {
        let owner_ty = self.resolve(owner);
        if matches!(owner_ty, Type::Var(_)) {
            return false; // owner not yet known; defer
        }
        match self.find_member(&owner_ty, name) {
            Some(found) => {
                let result_ty = self.resolve(result);
                self.unify(&found, &result_ty, span)
            }
            None => {
                self.handler.emit(AnzenError::NoMember { name, span });
                true
            }
        }
    }

    /// `find_member(owner, name)` (§4.6): a property or a single-overload
    /// method resolves directly; a struct's own name used as a value
    /// position is treated as its implicit constructor call, typed as a
    /// function from the struct's properties to the struct itself.
    fn find_member(&self, owner: &Type, name: Symbol) -> Option<Type> {
        let Type::Alias { id, .. } = owner else { return None };
        match self.ctx.nominal(*id)? {
            NominalType::Struct(s) => {
                if let Some(qty) = s.properties.get(&name) {
                    return Some(qty.ty.clone());
                }
                if let Some(overloads) = s.methods.get(&name) {
                    if overloads.len() == 1 {
                        return Some(Type::Function(overloads[0].clone()));
                    }
                }
                None
            }
            NominalType::Union(u) => u.cases.get(&name).map(|case| match case {
                Some(qty) => Type::Function(FunctionType {
                    placeholders: Vec::new(),
                    params: vec![(None, qty.clone())],
                    codomain: Box::new(QualifiedType::unqualified(owner.clone())),
                }),
                None => owner.clone(),
            }),
            NominalType::Interface(i) => i.members.get(&name).map(|qty| qty.ty.clone()),
        }
    }

    /// Tries each alternative against a snapshot of the current bindings,
    /// keeping the first that solves without emitting a new diagnostic.
    /// Tries every alternative against the same starting snapshot, rather
    /// than stopping at the first clean one: §8 I8 requires telling "no
    /// domain matched" (`InferenceError`) apart from "more than one
    /// matched" (`AmbiguousType`), which isn't observable if the search
    /// commits to the first success before knowing whether a later
    /// alternative would also have succeeded.
    fn solve_disjunction(&mut self, alternatives: &[Vec<Constraint>], span: Span) -> bool {
        let base_snapshot = self.ctx.snapshot_substitutions();
        let base_errors = self.handler.error_count();
        let mut successes: Vec<HashMap<TypeId, Type>> = Vec::new();

        for (branch, alt) in alternatives.iter().enumerate() {
            let mut sub_queue = alt.clone();
            for _ in 0..self.config.max_passes {
                if sub_queue.is_empty() {
                    break;
                }
                let mut next = Vec::new();
                let mut progressed = false;
                for c in sub_queue {
                    if self.solve_one(&c) {
                        progressed = true;
                    } else {
                        next.push(c);
                    }
                }
                sub_queue = next;
                if !progressed {
                    break;
                }
            }
            let clean = sub_queue.is_empty() && self.handler.error_count() == base_errors;
            tracing::trace!(branch, clean, "disjunction branch trial");
            if clean {
                successes.push(self.ctx.snapshot_substitutions());
            }
            // Each trial starts from the same clean slate, and whatever it
            // emitted along the way (success or not) is discarded here —
            // only the final verdict below reports a diagnostic.
            self.ctx.restore_substitutions(base_snapshot.clone());
            self.handler.truncate(base_errors);
        }

        match successes.len() {
            1 => {
                tracing::debug!(candidates = alternatives.len(), "disjunction resolved unambiguously");
                self.ctx.restore_substitutions(successes.into_iter().next().expect("len checked above"));
                true
            }
            0 => {
                tracing::debug!(candidates = alternatives.len(), "disjunction had no matching branch");
                self.handler.emit(AnzenError::InferenceError { span });
                true
            }
            _ => {
                tracing::debug!(candidates = alternatives.len(), matches = successes.len(), "disjunction is ambiguous");
                self.handler.emit(AnzenError::AmbiguousType { span, candidate_count: alternatives.len() });
                true
            }
        }
    }
}

fn constraint_span(c: &Constraint) -> Span {
    match c {
        Constraint::Equal { span, .. }
        | Constraint::Conforms { span, .. }
        | Constraint::Specializes { span, .. }
        | Constraint::Member { span, .. }
        | Constraint::Disjunction { span, .. } => *span,
    }
}
