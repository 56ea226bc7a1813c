//! The type-info block layout (§6): `{typeObject*, traceTable*,
//! bases[]+null terminator, idispatch_fn*, methods[]}`.
//!
//! Grounded on `createTypeInfoBlock`: the base-class list walks concrete
//! superclasses first (nearest to farthest), then the transitive interface
//! set, then a null terminator; `idispatch`/`methods` are only populated
//! for classes (structs and interfaces get null/empty fields instead,
//! since neither participates in virtual dispatch the way a class does).

use thorn_ir::DefnId;
use thorn_types::{CompositeKind, CompositeLookup};

use crate::idispatch::{build_interface_dispatch, InterfaceDispatchTable};
use crate::trace::TraceDescriptor;
use crate::vtable::method_slots;

/// A composite's full handoff layout. `bases` is given without an
/// explicit terminator — the backend is expected to null-terminate the
/// emitted array itself, the way every other variable-length array in
/// this handoff is backend-terminated.
#[derive(Clone, Debug)]
pub struct TypeInfoBlock {
    pub composite: DefnId,
    pub trace_table: Option<Vec<TraceDescriptor>>,
    pub bases: Vec<DefnId>,
    pub idispatch: Option<InterfaceDispatchTable>,
    pub methods: Vec<DefnId>,
}

/// Builds the base-class list: concrete superclasses from nearest to
/// farthest, followed by the transitive interface set in the order
/// `thorn_types::CompositeLookup` walks it.
fn base_class_list(composite: DefnId, module: &thorn_defn::Module) -> Vec<DefnId> {
    let mut bases = Vec::new();
    let mut current = module.super_of(composite);
    while let Some(super_type) = current {
        bases.push(super_type);
        current = module.super_of(super_type);
    }

    let mut interfaces: Vec<DefnId> = Vec::new();
    let mut stack: Vec<DefnId> = module.interfaces_of(composite).to_vec();
    while let Some(interface) = stack.pop() {
        if interfaces.contains(&interface) {
            continue;
        }
        stack.extend_from_slice(module.interfaces_of(interface));
        interfaces.push(interface);
    }
    bases.extend(interfaces);
    bases
}

/// Builds the complete TIB layout for one composite defn.
pub fn build_type_info_block(
    composite: DefnId,
    module: &thorn_defn::Module,
    pool: &thorn_types::Pool,
    field_offset: impl Fn(DefnId) -> u32,
    resolve_override: impl Fn(DefnId, DefnId) -> DefnId,
) -> TypeInfoBlock {
    let kind = module.composite_kind(composite);
    let bases = base_class_list(composite, module);

    let (idispatch, methods) = if kind == CompositeKind::Class {
        (Some(build_interface_dispatch(composite, module, resolve_override)), method_slots(composite, module))
    } else {
        (None, Vec::new())
    };

    TypeInfoBlock {
        composite,
        trace_table: crate::trace::build_trace_table(composite, module, pool, field_offset),
        bases,
        idispatch,
        methods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thorn_defn::{CompositeData, Defn, MethodTable, Module, Scope, TypedefDefn};
    use thorn_ir::{Name, Span};
    use thorn_types::{Idx, Pool};

    fn composite(module: &mut Module, kind: CompositeKind, super_type: Option<DefnId>, interfaces: Vec<DefnId>) -> DefnId {
        module.alloc(Defn::new(
            Span::DUMMY,
            Name::EMPTY,
            Name::EMPTY,
            Name::EMPTY,
            thorn_defn::DefnKind::Typedef(TypedefDefn {
                aliased_type: Idx(0),
                composite: Some(CompositeData {
                    kind,
                    super_type,
                    interfaces,
                    fields: Vec::new(),
                    member_scope: Scope::new(),
                    method_table: MethodTable::new(),
                }),
            }),
        ))
    }

    #[test]
    fn base_list_walks_superclasses_before_interfaces() {
        let mut module = Module::new(Name::EMPTY);
        let grandparent = composite(&mut module, CompositeKind::Class, None, Vec::new());
        let iface = composite(&mut module, CompositeKind::Interface, None, Vec::new());
        let parent = composite(&mut module, CompositeKind::Class, Some(grandparent), vec![iface]);
        let child = composite(&mut module, CompositeKind::Class, Some(parent), Vec::new());

        let bases = base_class_list(child, &module);
        assert_eq!(bases, vec![parent, grandparent]);
    }

    #[test]
    fn struct_has_no_idispatch_or_methods() {
        let mut module = Module::new(Name::EMPTY);
        let pool = Pool::new();
        let s = composite(&mut module, CompositeKind::Struct, None, Vec::new());
        let tib = build_type_info_block(s, &module, &pool, |_| 0, |_, m| m);
        assert!(tib.idispatch.is_none());
        assert!(tib.methods.is_empty());
    }

    #[test]
    fn class_gets_idispatch_even_with_no_interfaces() {
        let mut module = Module::new(Name::EMPTY);
        let pool = Pool::new();
        let c = composite(&mut module, CompositeKind::Class, None, Vec::new());
        let tib = build_type_info_block(c, &module, &pool, |_| 0, |_, m| m);
        assert!(tib.idispatch.is_some());
        assert!(tib.idispatch.unwrap().entries.is_empty());
    }
}
