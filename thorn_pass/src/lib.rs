//! The per-defn analysis pass manager (§4.2): the ordered pass list, the
//! running/finished bitset pair, cycle detection over the active call
//! stack, and the deferred-work queue drained by the module driver.

mod cycle;
mod manager;
mod pass;
mod worklist;

pub use cycle::CallStack;
pub use manager::{CycleError, PassHost, PassManager};
pub use pass::{BeginOutcome, DefnPasses, Pass, PassSet};
pub use worklist::{DeferredTask, Worklist};
