//! The Thorn driver: wires the analysis crates together over a module's
//! defn graph and exposes the pieces `main` and the integration tests
//! need directly, without going through the CLI.

pub mod cli;
pub mod context;
pub mod driver;
pub mod error;
pub mod loader;
pub mod sink;
pub mod tracing_setup;

pub use context::CompilationContext;
pub use error::DriverError;
pub use sink::StderrSink;
