//! The module: a flat arena owning every defn, addressed by `DefnId`.
//!
//! Composites live in the same arena as everything else — a composite is
//! just a `Typedef` defn whose `composite` field is populated — so
//! cross-references (super, field types, interfaces) are plain `DefnId`
//! indices rather than a separate reference-counted graph (see the
//! cyclic-reference-graph strategy note).

use thorn_ir::{DefnId, Name};
use thorn_pass::{DefnPasses, PassHost};
use thorn_types::{CompositeKind, CompositeLookup};

use crate::defn::{CompositeData, Defn, DefnKind};
use crate::scope::Scope;

pub struct Module {
    pub name: Name,
    defns: Vec<Defn>,
    passes: Vec<DefnPasses>,
    pub top_level_scope: Scope,
}

impl Module {
    #[must_use]
    pub fn new(name: Name) -> Self {
        Module { name, defns: Vec::new(), passes: Vec::new(), top_level_scope: Scope::new() }
    }

    /// Allocates `defn` into the flat arena and returns its handle. The
    /// caller is responsible for also inserting it into the appropriate
    /// scope (top-level, a composite's member scope, or a function's
    /// parameter/local scope).
    pub fn alloc(&mut self, defn: Defn) -> DefnId {
        let id = DefnId(self.defns.len() as u32);
        self.defns.push(defn);
        self.passes.push(DefnPasses::new());
        id
    }

    #[must_use]
    pub fn get(&self, id: DefnId) -> &Defn {
        &self.defns[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: DefnId) -> &mut Defn {
        &mut self.defns[id.0 as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.defns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defns.is_empty()
    }

    fn composite_data(&self, defn: DefnId) -> &CompositeData {
        match &self.get(defn).kind {
            DefnKind::Typedef(typedef) => typedef.composite.as_ref().expect("DefnId does not name a composite"),
            _ => panic!("DefnId does not name a Typedef"),
        }
    }
}

impl PassHost for Module {
    fn defn_passes_mut(&mut self, defn: DefnId) -> &mut DefnPasses {
        &mut self.passes[defn.0 as usize]
    }
}

impl CompositeLookup for Module {
    fn super_of(&self, defn: DefnId) -> Option<DefnId> {
        self.composite_data(defn).super_type
    }

    fn interfaces_of(&self, defn: DefnId) -> &[DefnId] {
        &self.composite_data(defn).interfaces
    }

    fn composite_kind(&self, defn: DefnId) -> CompositeKind {
        self.composite_data(defn).kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thorn_ir::Span;

    fn namespace_defn() -> Defn {
        Defn::new(Span::DUMMY, Name::EMPTY, Name::EMPTY, Name::EMPTY, DefnKind::Namespace(crate::defn::NamespaceDefn { scope: Scope::new() }))
    }

    #[test]
    fn alloc_assigns_increasing_ids() {
        let mut module = Module::new(Name::EMPTY);
        let a = module.alloc(namespace_defn());
        let b = module.alloc(namespace_defn());
        assert_eq!(a, DefnId(0));
        assert_eq!(b, DefnId(1));
        assert_eq!(module.len(), 2);
    }

    #[test]
    fn get_roundtrips_through_alloc() {
        let mut module = Module::new(Name::EMPTY);
        let id = module.alloc(namespace_defn());
        assert!(matches!(module.get(id).kind, DefnKind::Namespace(_)));
    }

    #[test]
    fn fresh_defn_has_no_finished_passes() {
        let mut module = Module::new(Name::EMPTY);
        let id = module.alloc(namespace_defn());
        assert!(!module.defn_passes_mut(id).is_finished(thorn_pass::Pass::FieldPass));
    }
}
