//! Ordering instance methods into the flat vtable slot array the TIB's
//! `methods` field and the interface dispatch tables both index into.

use thorn_defn::{DefnKind, Module};
use thorn_ir::DefnId;

/// Every instance method of `composite` assigned a dispatch slot, ordered
/// by that slot. A class with no virtual methods returns an empty vec.
///
/// Grounded on `genMethodArray(type->instanceMethods_)`: the backend walks
/// a flat, already-ordered method list rather than re-deriving slot order
/// from names, so that work belongs here, not in the backend.
#[must_use]
pub fn method_slots(composite: DefnId, module: &Module) -> Vec<DefnId> {
    let data = composite_data(composite, module);
    let mut slots: Vec<(u32, DefnId)> = Vec::new();
    for &name in data.member_scope.names() {
        for &candidate in data.member_scope.lookup(name) {
            if let DefnKind::Function(function) = &module.get(candidate).kind {
                if let Some(index) = function.dispatch_index {
                    slots.push((index, candidate));
                }
            }
        }
    }
    slots.sort_by_key(|(index, _)| *index);
    slots.into_iter().map(|(_, defn)| defn).collect()
}

fn composite_data(defn: DefnId, module: &Module) -> &thorn_defn::CompositeData {
    match &module.get(defn).kind {
        DefnKind::Typedef(typedef) => typedef.composite.as_ref().expect("method_slots called on a non-composite defn"),
        _ => panic!("method_slots called on a non-Typedef defn"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thorn_defn::{CompositeData, Defn, FunctionDefn, FunctionFlags, MethodTable, Scope, TypedefDefn};
    use thorn_ir::{Name, Span};
    use thorn_types::CompositeKind;

    fn function_defn(module: &mut Module, parent: DefnId, dispatch_index: Option<u32>) -> DefnId {
        let defn = Defn::new(
            Span::DUMMY,
            Name::EMPTY,
            Name::EMPTY,
            Name::EMPTY,
            DefnKind::Function(FunctionDefn {
                flags: FunctionFlags::empty(),
                local_scopes: Vec::new(),
                parameter_scope: Scope::new(),
                body: None,
                overridden: Vec::new(),
                intrinsic: None,
                merged_to: None,
                dispatch_index,
                return_type: None,
                self_param: None,
            }),
        );
        let id = module.alloc(defn);
        module.get_mut(id).parent = Some(parent);
        id
    }

    #[test]
    fn methods_are_ordered_by_dispatch_index_not_declaration_order() {
        let mut module = Module::new(Name::EMPTY);
        let class = module.alloc(Defn::new(
            Span::DUMMY,
            Name::EMPTY,
            Name::EMPTY,
            Name::EMPTY,
            DefnKind::Typedef(TypedefDefn {
                aliased_type: thorn_types::Idx(0),
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

        let second = function_defn(&mut module, class, Some(1));
        let first = function_defn(&mut module, class, Some(0));
        let unassigned = function_defn(&mut module, class, None);

        let name_a = Name::EMPTY;
        if let DefnKind::Typedef(typedef) = &mut module.get_mut(class).kind {
            let composite = typedef.composite.as_mut().unwrap();
            composite.member_scope.insert(name_a, second);
            composite.member_scope.insert(name_a, first);
            composite.member_scope.insert(name_a, unassigned);
        }

        assert_eq!(method_slots(class, &module), vec![first, second]);
    }
}
