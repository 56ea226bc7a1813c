//! The whole-module handoff (§6): the set of top-level defns finished and
//! singular, paired with the TIB layout computed for each composite among
//! them.

use thorn_defn::{DefnKind, Module, Traits};
use thorn_ir::DefnId;
use thorn_pass::{Pass, PassHost};
use thorn_types::Pool;

use crate::tib::{build_type_info_block, TypeInfoBlock};

/// A composite defn's computed layout, alongside the handle it describes.
pub struct TypeHandoff {
    pub defn: DefnId,
    pub tib: TypeInfoBlock,
}

/// Everything the analyzer hands a backend for one module: the finished,
/// singular top-level defns, and the TIB for each one that is a
/// composite.
pub struct ModuleHandoff {
    pub finished_defns: Vec<DefnId>,
    pub types: Vec<TypeHandoff>,
}

impl ModuleHandoff {
    /// `field_offset`/`resolve_override` are supplied by the caller since
    /// both are backend layout concerns this crate doesn't own (see
    /// `build_type_info_block`).
    pub fn build(
        module: &mut Module,
        pool: &Pool,
        field_offset: impl Fn(DefnId) -> u32,
        resolve_override: impl Fn(DefnId, DefnId) -> DefnId,
    ) -> Self {
        let candidates: Vec<DefnId> = top_level_defns(module);
        let mut finished_defns = Vec::new();
        let mut types = Vec::new();

        for defn in candidates {
            let ready = module.defn_passes_mut(defn).is_finished(Pass::CompletionPass) && module.get(defn).traits.contains(Traits::SINGULAR);
            if !ready {
                continue;
            }
            finished_defns.push(defn);

            if let DefnKind::Typedef(typedef) = &module.get(defn).kind {
                if typedef.composite.is_some() {
                    let tib = build_type_info_block(defn, module, pool, &field_offset, &resolve_override);
                    types.push(TypeHandoff { defn, tib });
                }
            }
        }

        ModuleHandoff { finished_defns, types }
    }
}

/// Every defn named directly in the module's top-level scope. A module's
/// own arena may also hold nested defns (fields, parameters, locals)
/// reachable only through their owners, which this handoff never visits
/// directly — the backend reaches them through their owning composite's
/// `fields`/`methods` lists instead.
fn top_level_defns(module: &Module) -> Vec<DefnId> {
    module
        .top_level_scope
        .names()
        .iter()
        .flat_map(|&name| module.top_level_scope.lookup(name).to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use thorn_defn::{CompositeData, Defn, MethodTable, Scope, TypedefDefn};
    use thorn_ir::{Name, Span};
    use thorn_types::{CompositeKind, Idx};

    #[test]
    fn unfinished_defns_are_excluded() {
        let mut module = Module::new(Name::EMPTY);
        let pool = Pool::new();
        let name = Name::EMPTY;
        let defn = module.alloc(Defn::new(
            Span::DUMMY,
            name,
            Name::EMPTY,
            Name::EMPTY,
            DefnKind::Typedef(TypedefDefn {
                aliased_type: Idx(0),
                composite: Some(CompositeData {
                    kind: CompositeKind::Class,
                    super_type: None,
                    interfaces: Vec::new(),
                    fields: Vec::new(),
                    member_scope: Scope::new(),
                    method_table: MethodTable::new(),
                }),
            }),
        ));
        module.top_level_scope.insert(name, defn);

        let handoff = ModuleHandoff::build(&mut module, &pool, |_| 0, |_, m| m);
        assert!(handoff.finished_defns.is_empty());
        assert!(handoff.types.is_empty());
    }

    #[test]
    fn finished_singular_composite_produces_a_tib() {
        let mut module = Module::new(Name::EMPTY);
        let pool = Pool::new();
        let name = Name::EMPTY;
        let defn = module.alloc(Defn::new(
            Span::DUMMY,
            name,
            Name::EMPTY,
            Name::EMPTY,
            DefnKind::Typedef(TypedefDefn {
                aliased_type: Idx(0),
                composite: Some(CompositeData {
                    kind: CompositeKind::Class,
                    super_type: None,
                    interfaces: Vec::new(),
                    fields: Vec::new(),
                    member_scope: Scope::new(),
                    method_table: MethodTable::new(),
                }),
            }),
        ));
        module.top_level_scope.insert(name, defn);
        module.get_mut(defn).traits.insert(Traits::SINGULAR);
        module.defn_passes_mut(defn).begin(Pass::CompletionPass);
        module.defn_passes_mut(defn).finish(Pass::CompletionPass);

        let handoff = ModuleHandoff::build(&mut module, &pool, |_| 0, |_, m| m);
        assert_eq!(handoff.finished_defns, vec![defn]);
        assert_eq!(handoff.types.len(), 1);
        assert_eq!(handoff.types[0].defn, defn);
    }
}
