//! The pluggable sink diagnostics are reported into, and the queue that
//! every analyzer phase shares through the `CompilationContext`.

use crate::{Diagnostic, Severity};

/// Where diagnostics go. Implemented by a string buffer for tests and by a
/// streaming writer for the CLI, per the design's "pluggable sink"
/// requirement.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A sink that renders each diagnostic into an in-memory buffer, for tests
/// and for `--explain`-style tooling.
#[derive(Default)]
pub struct BufferSink {
    pub rendered: Vec<String>,
}

impl DiagnosticSink for BufferSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.rendered.push(diagnostic.to_string());
    }
}

/// Accumulates diagnostics for one compilation and tracks the error count
/// a module checks after each major phase (per the error-handling design's
/// "nonzero error count" phase gate).
pub struct DiagnosticQueue<S: DiagnosticSink> {
    sink: S,
    error_count: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<S: DiagnosticSink> DiagnosticQueue<S> {
    pub fn new(sink: S) -> Self {
        DiagnosticQueue { sink, error_count: 0, diagnostics: Vec::new() }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity.is_failure() {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic.clone());
        self.sink.report(diagnostic);
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The process exit code implied by everything reported so far: `0`
    /// unless any diagnostic of severity `Error` or `Fatal` was emitted.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_errors())
    }
}

#[cfg(test)]
mod tests {
    use thorn_ir::Span;

    use super::*;
    use crate::ErrorCode;

    #[test]
    fn errors_increment_count() {
        let mut q = DiagnosticQueue::new(BufferSink::default());
        q.report(Diagnostic::error(ErrorCode::Undefined, Span::DUMMY, "x"));
        q.report(Diagnostic::warning(ErrorCode::Undefined, Span::DUMMY, "y"));
        assert_eq!(q.error_count(), 1);
        assert_eq!(q.exit_code(), 1);
    }

    #[test]
    fn clean_run_exits_zero() {
        let mut q = DiagnosticQueue::new(BufferSink::default());
        q.report(Diagnostic::new(Severity::Info, ErrorCode::Undefined, Span::DUMMY, "note"));
        assert_eq!(q.exit_code(), 0);
        assert!(!q.has_errors());
    }

    #[test]
    fn sink_receives_every_report() {
        let mut q = DiagnosticQueue::new(BufferSink::default());
        q.report(Diagnostic::error(ErrorCode::Undefined, Span::DUMMY, "x"));
        assert_eq!(q.diagnostics().len(), 1);
    }
}
