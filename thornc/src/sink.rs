//! The streaming `DiagnosticSink` the CLI installs (`thorn_diagnostic`
//! ships only the in-memory `BufferSink` tests use).

use thorn_diagnostic::{Diagnostic, DiagnosticSink, Severity};

/// Writes each diagnostic to stderr as it's reported.
#[derive(Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Debug | Severity::Info => tracing::info!(%diagnostic),
            Severity::Warning => tracing::warn!(%diagnostic),
            Severity::Error | Severity::Fatal => eprintln!("{diagnostic}"),
        }
        for (span, message) in &diagnostic.labels {
            eprintln!("  {span}: {message}");
        }
    }
}
