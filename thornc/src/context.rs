//! The explicit context threaded through every analyzer entry point
//! (§9's "Global mutable state" design note): owns the type pool, the
//! name interner, and the diagnostic sink so no crate below this one
//! reaches for a hidden global.

use thorn_diagnostic::{DiagnosticQueue, DiagnosticSink};
use thorn_ir::NameInterner;
use thorn_template::InstanceCache;
use thorn_types::Pool;

pub struct CompilationContext<S: DiagnosticSink> {
    pub pool: Pool,
    pub interner: NameInterner,
    pub instances: InstanceCache,
    pub diagnostics: DiagnosticQueue<S>,
}

impl<S: DiagnosticSink> CompilationContext<S> {
    pub fn new(sink: S) -> Self {
        CompilationContext {
            pool: Pool::new(),
            interner: NameInterner::new(),
            instances: InstanceCache::new(),
            diagnostics: DiagnosticQueue::new(sink),
        }
    }
}
