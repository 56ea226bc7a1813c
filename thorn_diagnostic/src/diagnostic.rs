//! A single diagnosed problem: severity, code, message, and location.

use std::fmt;

use thorn_ir::Span;

use crate::ErrorCode;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    /// Whether a diagnostic of this severity should flip the driver's exit
    /// code to failure, per the Driver CLI contract.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Severity::Error | Severity::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        write!(f, "{s}")
    }
}

/// A single diagnosed problem.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
    /// Secondary spans with their own short messages, rendered as
    /// supporting context (e.g. "previous definition here").
    pub labels: Vec<(Span, String)>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(severity: Severity, code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        Diagnostic { severity, code, message: message.into(), span, labels: Vec::new() }
    }

    #[must_use]
    pub fn error(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, span, message)
    }

    #[must_use]
    pub fn fatal(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, code, span, message)
    }

    #[must_use]
    pub fn warning(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, span, message)
    }

    #[must_use]
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push((span, message.into()));
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {} ({})", self.severity, self.code, self.message, self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_failure() {
        let d = Diagnostic::error(ErrorCode::Undefined, Span::DUMMY, "oops");
        assert!(d.severity.is_failure());
    }

    #[test]
    fn warning_is_not_failure() {
        let d = Diagnostic::warning(ErrorCode::Undefined, Span::DUMMY, "hm");
        assert!(!d.severity.is_failure());
    }

    #[test]
    fn labels_accumulate() {
        let d = Diagnostic::error(ErrorCode::MultiplyDefined, Span::DUMMY, "dup")
            .with_label(Span::DUMMY, "previous definition here");
        assert_eq!(d.labels.len(), 1);
    }
}
