//! Source-location model, name interning, and the AST contract shared by
//! every later stage of the Thorn front-end.
//!
//! Three things live here, and nothing else:
//! - [`Span`] / [`FileId`]: where something came from, for diagnostics.
//! - [`Name`] / [`NameInterner`]: interned identifiers.
//! - [`ast`]: the untyped tree the (external) parser produces.
//! - [`DefnId`]: the bare arena handle definitions are addressed by.
//!
//! [`DefnId`] lives here rather than in `thorn_defn` so that `thorn_types`
//! can reference "the defn that owns this composite type" without
//! depending on the definition graph itself — see the design note on
//! cyclic reference graphs: composites and field types refer to each
//! other, so both `thorn_types` and `thorn_defn` need a shared, opaque
//! handle rather than depending on one another's concrete structs.
//!
//! Everything in this crate is intentionally dumb: no type information, no
//! name resolution, no ownership beyond "the module that contains me".
//! Those concerns belong to `thorn_defn`, `thorn_types`, and `thorn_expr`.

pub mod ast;
mod name;
mod span;

pub use ast::AstExprId;
pub use name::{Name, NameInterner};
pub use span::{FileId, Span};

/// Opaque handle into a module's flat defn arena (see `thorn_defn::Module`).
///
/// Never dereferenced directly by this crate or by `thorn_types`; only the
/// owning `thorn_defn::Module` knows how to turn this back into a `Defn`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct DefnId(pub u32);
