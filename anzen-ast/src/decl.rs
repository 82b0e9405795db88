//! Declaration nodes (§3.1).

use anzen_util::{Span, Symbol};

use crate::expr::{Expr, TypeSig};
use crate::ids::{ScopeId, SymbolId, TypeId};
use crate::qualifier::{BindingOp, QualifierSet};
use crate::stmt::Block;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunKind {
    Regular,
    Method,
    Constructor,
    Destructor,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Fun(FunDecl),
    Prop(PropDecl),
    Struct(StructDecl),
    Union(UnionDecl),
    Interface(InterfaceDecl),
    TypeExt(TypeExtDecl),
}

impl Decl {
    pub fn name(&self) -> Symbol {
        match self {
            Decl::Fun(d) => d.name,
            Decl::Prop(d) => d.name,
            Decl::Struct(d) => d.name,
            Decl::Union(d) => d.name,
            Decl::Interface(d) => d.name,
            Decl::TypeExt(_) => panic!("TypeExtDecl has no name of its own"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunDecl {
    pub name: Symbol,
    pub kind: FunKind,
    pub placeholders: Vec<Symbol>,
    pub params: Vec<ParamDecl>,
    pub codomain: Option<TypeSig>,
    pub body: Option<Block>,
    pub span: Span,
    /// The scope this declaration was inserted into.
    pub scope: Option<ScopeId>,
    /// The scope this declaration owns: placeholders and parameters live
    /// here, distinct from the body's own scope (§4.3 rule 4).
    pub inner_scope: Option<ScopeId>,
    pub symbol: Option<SymbolId>,
    pub ty: Option<TypeId>,
}

impl FunDecl {
    pub fn new(name: Symbol, kind: FunKind, span: Span) -> Self {
        FunDecl {
            name,
            kind,
            placeholders: Vec::new(),
            params: Vec::new(),
            codomain: None,
            body: None,
            span,
            scope: None,
            inner_scope: None,
            symbol: None,
            ty: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub label: Option<Symbol>,
    pub name: Symbol,
    pub signature: TypeSig,
    pub default: Option<Expr>,
    pub qualifiers: QualifierSet,
    pub span: Span,
    pub scope: Option<ScopeId>,
    pub symbol: Option<SymbolId>,
    pub ty: Option<TypeId>,
}

impl ParamDecl {
    pub fn new(name: Symbol, signature: TypeSig, span: Span) -> Self {
        ParamDecl {
            label: None,
            name,
            signature,
            default: None,
            qualifiers: QualifierSet::EMPTY,
            span,
            scope: None,
            symbol: None,
            ty: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropDecl {
    pub name: Symbol,
    pub signature: Option<TypeSig>,
    pub init: Option<(BindingOp, Expr)>,
    pub reassignable: bool,
    pub span: Span,
    pub scope: Option<ScopeId>,
    pub symbol: Option<SymbolId>,
    pub ty: Option<TypeId>,
}

impl PropDecl {
    pub fn new(name: Symbol, span: Span) -> Self {
        PropDecl {
            name,
            signature: None,
            init: None,
            reassignable: false,
            span,
            scope: None,
            symbol: None,
            ty: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Symbol,
    pub placeholders: Vec<Symbol>,
    pub members: Vec<Decl>,
    pub span: Span,
    pub scope: Option<ScopeId>,
    pub inner_scope: Option<ScopeId>,
    pub symbol: Option<SymbolId>,
    pub ty: Option<TypeId>,
}

impl StructDecl {
    pub fn new(name: Symbol, span: Span) -> Self {
        StructDecl {
            name,
            placeholders: Vec::new(),
            members: Vec::new(),
            span,
            scope: None,
            inner_scope: None,
            symbol: None,
            ty: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnionTypeCaseDecl {
    pub name: Symbol,
    pub signature: Option<TypeSig>,
    pub span: Span,
    pub scope: Option<ScopeId>,
    pub symbol: Option<SymbolId>,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct UnionDecl {
    pub name: Symbol,
    pub placeholders: Vec<Symbol>,
    pub cases: Vec<UnionTypeCaseDecl>,
    pub span: Span,
    pub scope: Option<ScopeId>,
    pub inner_scope: Option<ScopeId>,
    pub symbol: Option<SymbolId>,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: Symbol,
    pub placeholders: Vec<Symbol>,
    pub members: Vec<Decl>,
    pub span: Span,
    pub scope: Option<ScopeId>,
    pub inner_scope: Option<ScopeId>,
    pub symbol: Option<SymbolId>,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct TypeExtDecl {
    pub extended: TypeSig,
    pub members: Vec<Decl>,
    pub span: Span,
    pub scope: Option<ScopeId>,
    pub inner_scope: Option<ScopeId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anzen_util::Span;

    #[test]
    fn fresh_fun_decl_has_no_scope_until_pass_one() {
        let f = FunDecl::new(Symbol::intern("f"), FunKind::Regular, Span::DUMMY);
        assert!(f.scope.is_none());
        assert!(f.inner_scope.is_none());
    }

    #[test]
    fn decl_name_reads_through_the_enum() {
        let s = StructDecl::new(Symbol::intern("Pair"), Span::DUMMY);
        assert_eq!(Decl::Struct(s).name(), Symbol::intern("Pair"));
    }
}
