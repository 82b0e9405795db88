//! A non-fatal diagnostics collector.
//!
//! Every pass records errors on a shared [`Handler`] and keeps going where
//! recovery is safe (§7: mark the node `ErrorType`, move on). Nothing here
//! knows how to *format* a diagnostic — no source snippets, no numbered
//! codes, no pretty-printing (§1 Non-goals). The driver decides that; the
//! core only guarantees every error that occurred got collected exactly
//! once, in emission order.

/// Collects values of a pass's error type `E` without halting the pipeline.
#[derive(Debug, Clone)]
pub struct Handler<E> {
    diagnostics: Vec<E>,
}

impl<E> Handler<E> {
    pub fn new() -> Self {
        Self { diagnostics: Vec::new() }
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[E] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<E> {
        self.diagnostics
    }

    /// Drops every diagnostic emitted after `len`. Used by backtracking
    /// search (e.g. overload resolution) to discard the noise a rejected
    /// trial left behind before trying the next alternative.
    pub fn truncate(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }
}

impl<E: std::fmt::Debug> Handler<E> {
    pub fn emit(&mut self, error: E) {
        tracing::debug!(?error, "diagnostic emitted");
        self.diagnostics.push(error);
    }
}

impl<E> Default for Handler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_handler_has_no_errors() {
        let handler: Handler<&str> = Handler::new();
        assert!(!handler.has_errors());
        assert_eq!(handler.error_count(), 0);
    }

    #[test]
    fn emit_accumulates_without_halting() {
        let mut handler = Handler::new();
        handler.emit("first");
        handler.emit("second");
        assert_eq!(handler.error_count(), 2);
        assert_eq!(handler.diagnostics(), &["first", "second"]);
    }

    #[test]
    fn into_diagnostics_preserves_emission_order() {
        let mut handler = Handler::new();
        handler.emit(1);
        handler.emit(2);
        handler.emit(3);
        assert_eq!(handler.into_diagnostics(), vec![1, 2, 3]);
    }
}
