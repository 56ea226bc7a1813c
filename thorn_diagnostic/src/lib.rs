//! Diagnostic taxonomy and reporting for the Thorn front-end.
//!
//! Every analysis error is a [`Diagnostic`] pushed into a
//! [`DiagnosticQueue`] — never a Rust `Result::Err` — so a module can keep
//! analyzing after one subexpression fails (the "local" error-propagation
//! model from the design's error-handling section).

mod diagnostic;
mod error_code;
mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use queue::{BufferSink, DiagnosticQueue, DiagnosticSink};
