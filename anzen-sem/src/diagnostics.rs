//! The semantic analyzer's error taxonomy (§7).
//!
//! Every variant is non-fatal: passes keep going after emitting one,
//! marking the offending node's type `Type::Error` (§4.1, §4.6) so later
//! passes don't cascade a single mistake into dozens of spurious ones. A
//! module that accumulated at least one of these ends pass 5 in
//! `ModuleState::Errored` instead of `Typed` (§4.8).

use anzen_util::Span;
use anzen_util::Symbol;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnzenError {
    #[error("'{name}' is already declared in this scope at {previous:?}")]
    DuplicateDeclaration { name: Symbol, span: Span, previous: Span },

    #[error("undefined symbol '{name}'")]
    UndefinedSymbol { name: Symbol, span: Span },

    #[error("'{name}' does not name a type")]
    InvalidTypeIdentifier { name: Symbol, span: Span },

    #[error("incompatible type qualifiers at {span:?}")]
    IncompatibleQualifiers { span: Span },

    #[error("could not infer a type for this expression")]
    InferenceError { span: Span },

    #[error("expression is ambiguous between {candidate_count} candidate types")]
    AmbiguousType { span: Span, candidate_count: usize },

    #[error("no member named '{name}' on this type")]
    NoMember { name: Symbol, span: Span },

    #[error("'{name}' has no '__new__' initializer matching this call")]
    NoInitializer { name: Symbol, span: Span },
}

impl AnzenError {
    pub fn span(&self) -> Span {
        match self {
            AnzenError::DuplicateDeclaration { span, .. }
            | AnzenError::UndefinedSymbol { span, .. }
            | AnzenError::InvalidTypeIdentifier { span, .. }
            | AnzenError::IncompatibleQualifiers { span }
            | AnzenError::InferenceError { span }
            | AnzenError::AmbiguousType { span, .. }
            | AnzenError::NoMember { span, .. }
            | AnzenError::NoInitializer { span, .. } => *span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_declaration_message_names_the_symbol() {
        let err = AnzenError::DuplicateDeclaration { name: Symbol::intern("x"), span: Span::new(4, 5), previous: Span::new(0, 1) };
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn span_accessor_reads_through_every_variant() {
        let err = AnzenError::UndefinedSymbol { name: Symbol::intern("y"), span: Span::new(1, 2) };
        assert_eq!(err.span(), Span::new(1, 2));
    }
}
