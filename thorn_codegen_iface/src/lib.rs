//! The handoff computed for a lower-level code generator (§6 "Interface
//! consumed by the code-generator"). This crate never emits code itself —
//! it reads the finished defn graph and type pool and produces the layout
//! data a backend needs to lay out objects and dispatch through them:
//! type-info blocks, interface dispatch tables, and trace tables for the
//! collector to walk reference-bearing fields.

mod handoff;
mod idispatch;
mod tib;
mod trace;
mod vtable;

pub use handoff::{ModuleHandoff, TypeHandoff};
pub use idispatch::{InterfaceDispatchEntry, InterfaceDispatchTable};
pub use tib::TypeInfoBlock;
pub use trace::TraceDescriptor;
pub use vtable::method_slots;
