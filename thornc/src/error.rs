//! Internal, programmer-facing driver errors (§10.3). User-facing semantic
//! errors never reach here — they're `Diagnostic`s pushed to the sink.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("could not read source file {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    /// This workspace takes the untyped AST as a given input (§1's
    /// lexing/parsing Non-goal); there is no lexer or parser crate here
    /// to turn source text into one. Graceful per §7's Internal taxonomy,
    /// not a bug to work around.
    #[error("no parser is available in this build to turn {path} into an AST")]
    NoParserAvailable { path: PathBuf },

    #[error("analysis reported {count} error diagnostic(s)")]
    AnalysisFailed { count: usize },
}
