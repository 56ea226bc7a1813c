//! The post-`ControlFlowPass` typed body table, keyed by the owning
//! function's `DefnId`. Kept separate from `thorn_defn::FunctionDefn` so
//! the defn graph crate never depends on this crate's expression ADT.

use rustc_hash::FxHashMap;
use thorn_ir::DefnId;

use crate::expr::{ExprArena, ExprId};

#[derive(Default)]
pub struct TypedBodies {
    arena: ExprArena,
    bodies: FxHashMap<DefnId, ExprId>,
}

impl TypedBodies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn arena(&self) -> &ExprArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut ExprArena {
        &mut self.arena
    }

    pub fn set_body(&mut self, function: DefnId, root: ExprId) {
        self.bodies.insert(function, root);
    }

    #[must_use]
    pub fn body_of(&self, function: DefnId) -> Option<ExprId> {
        self.bodies.get(&function).copied()
    }
}
