//! The per-class interface dispatch table (§6): given an interface id and
//! method-table slot, return the implementing method. Grounded on
//! `genInterfaceDispatchFunc`, which builds a per-class function that
//! linearly tests the requested interface against `type->interfaces_` and
//! returns the matching interface's method-table entry, falling through to
//! a typecast-failure trap if none match. This crate computes that table;
//! the backend is responsible for emitting the actual dispatch chain (or a
//! jump table) over it.

use thorn_ir::DefnId;
use thorn_types::CompositeLookup;

use crate::vtable::method_slots;

/// One interface a class implements, with the class's own methods
/// arranged in that interface's slot order.
#[derive(Clone, Debug)]
pub struct InterfaceDispatchEntry {
    pub interface: DefnId,
    /// `method_table[slot]` is the class's implementation of the
    /// interface method at that slot. Built by matching the interface's
    /// own `method_slots` order, not the class's declaration order.
    pub method_table: Vec<DefnId>,
}

/// A class's full interface dispatch table: one entry per interface it
/// implements (directly or transitively), tested in declaration order
/// exactly as `genInterfaceDispatchFunc`'s linear chain does.
#[derive(Clone, Debug, Default)]
pub struct InterfaceDispatchTable {
    pub entries: Vec<InterfaceDispatchEntry>,
}

/// Builds `class`'s interface dispatch table. `resolve_override` maps an
/// interface method's `DefnId` to the class's concrete override of it;
/// the caller supplies this because override resolution lives in
/// `thorn_pass`'s merge step, not in this crate.
pub fn build_interface_dispatch(
    class: DefnId,
    module: &thorn_defn::Module,
    resolve_override: impl Fn(DefnId, DefnId) -> DefnId,
) -> InterfaceDispatchTable {
    let mut entries = Vec::new();
    for &interface in module.interfaces_of(class) {
        let interface_slots = method_slots(interface, module);
        let method_table = interface_slots.into_iter().map(|method| resolve_override(class, method)).collect();
        entries.push(InterfaceDispatchEntry { interface, method_table });
    }
    InterfaceDispatchTable { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thorn_defn::{CompositeData, Defn, DefnKind, FunctionDefn, FunctionFlags, MethodTable, Module, Scope, TypedefDefn};
    use thorn_ir::{Name, Span};
    use thorn_types::{CompositeKind, Idx};

    fn interface_method(module: &mut Module, interface: DefnId, slot: u32, name: Name) -> DefnId {
        let method = module.alloc(Defn::new(
            Span::DUMMY,
            name,
            Name::EMPTY,
            Name::EMPTY,
            DefnKind::Function(FunctionDefn {
                flags: FunctionFlags::INTERFACE_METHOD,
                local_scopes: Vec::new(),
                parameter_scope: Scope::new(),
                body: None,
                overridden: Vec::new(),
                intrinsic: None,
                merged_to: None,
                dispatch_index: Some(slot),
                return_type: None,
                self_param: None,
            }),
        ));
        module.get_mut(method).parent = Some(interface);
        if let DefnKind::Typedef(typedef) = &mut module.get_mut(interface).kind {
            typedef.composite.as_mut().unwrap().member_scope.insert(name, method);
        }
        method
    }

    fn composite(module: &mut Module, kind: CompositeKind, interfaces: Vec<DefnId>) -> DefnId {
        module.alloc(Defn::new(
            Span::DUMMY,
            Name::EMPTY,
            Name::EMPTY,
            Name::EMPTY,
            DefnKind::Typedef(TypedefDefn {
                aliased_type: Idx(0),
                composite: Some(CompositeData {
                    kind,
                    super_type: None,
                    interfaces,
                    fields: Vec::new(),
                    member_scope: Scope::new(),
                    method_table: MethodTable::new(),
                }),
            }),
        ))
    }

    #[test]
    fn dispatch_table_follows_interface_slot_order() {
        let mut module = Module::new(Name::EMPTY);
        let interface = composite(&mut module, CompositeKind::Interface, Vec::new());
        let name_a = Name::EMPTY;
        let iface_method = interface_method(&mut module, interface, 0, name_a);

        let class = composite(&mut module, CompositeKind::Class, vec![interface]);
        let class_method = module.alloc(Defn::new(
            Span::DUMMY,
            Name::EMPTY,
            Name::EMPTY,
            Name::EMPTY,
            DefnKind::Function(FunctionDefn {
                flags: FunctionFlags::empty(),
                local_scopes: Vec::new(),
                parameter_scope: Scope::new(),
                body: None,
                overridden: vec![iface_method],
                intrinsic: None,
                merged_to: None,
                dispatch_index: Some(0),
                return_type: None,
                self_param: None,
            }),
        ));

        let table = build_interface_dispatch(class, &module, |_, _| class_method);
        assert_eq!(table.entries.len(), 1);
        assert_eq!(table.entries[0].interface, interface);
        assert_eq!(table.entries[0].method_table, vec![class_method]);
    }
}
