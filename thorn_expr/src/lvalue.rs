//! LValue/RValue split and property lowering (§4.3).

use thorn_defn::{Defn, DefnKind, PropertyDefn};
use thorn_ir::DefnId;

use crate::expr::{Expr, ExprId, ExprKind};

/// What a property reference lowers to, decided by `lower_property`.
#[derive(Debug)]
pub enum PropertyLowering {
    /// Direct field access: permitted only when the property is final
    /// and the backing field is reachable without a virtual call.
    DirectField(DefnId),
    /// A (possibly virtual) call to the synthesized getter/setter.
    Call { accessor: DefnId, virtual_dispatch: bool },
}

/// Property lowering rule: a direct field load/store is used only when
/// the property is final *and* direct access is otherwise permitted
/// (no override could intercept it); everything else routes through the
/// accessor, dispatched virtually unless the owning composite forbids it
/// (interfaces and non-final classes always dispatch virtually).
#[must_use]
pub fn lower_property(property: &PropertyDefn, direct_access_permitted: bool, owner_requires_vtable_dispatch: bool, is_store: bool) -> PropertyLowering {
    let accessor = if is_store { property.setter } else { property.getter };
    if property.is_final && direct_access_permitted {
        if let Some(field) = property.backing_field {
            return PropertyLowering::DirectField(field);
        }
    }
    PropertyLowering::Call { accessor: accessor.unwrap_or(DefnId(0)), virtual_dispatch: owner_requires_vtable_dispatch || !property.is_final }
}

/// `reduceValueRef`: resolves an lvalue-producing AST node to its typed
/// referent without performing any property getter call — used both when
/// an expression will be stored to (`is_store = true`) and when it will
/// subsequently be loaded.
#[must_use]
pub fn reduce_value_ref(defn: DefnId, base: Option<ExprId>) -> ExprKind {
    ExprKind::LValue { defn, base }
}

/// `reduceLoadValue`: like `reduce_value_ref`, but when the referent is a
/// property, performs the getter call instead of returning a bare field
/// reference.
#[must_use]
pub fn reduce_load_value(referent: ExprKind, property: Option<(&PropertyDefn, bool, bool)>, arena: &mut crate::expr::ExprArena, ty: thorn_types::QualifiedType, span: thorn_ir::Span) -> ExprId {
    match property {
        Some((property, direct_access_permitted, owner_requires_vtable_dispatch)) => {
            match lower_property(property, direct_access_permitted, owner_requires_vtable_dispatch, false) {
                PropertyLowering::DirectField(field) => arena.alloc(Expr { kind: ExprKind::LValue { defn: field, base: None }, ty, span }),
                PropertyLowering::Call { accessor, virtual_dispatch } => {
                    if virtual_dispatch {
                        let receiver = arena.alloc(Expr { kind: referent, ty, span });
                        arena.alloc(Expr { kind: ExprKind::VTableCall { receiver: Box::new(receiver), slot: 0, args: Vec::new() }, ty, span })
                    } else {
                        arena.alloc(Expr { kind: ExprKind::FnCall { callee: accessor, args: Vec::new() }, ty, span })
                    }
                }
            }
        }
        None => arena.alloc(Expr { kind: referent, ty, span }),
    }
}

/// `reduceStoreValue`: turns a property assignment into a setter call;
/// non-property lvalues become a plain `Assign`.
#[must_use]
pub fn reduce_store_value(
    target_kind: ExprKind,
    property: Option<(&PropertyDefn, bool, bool)>,
    value: ExprId,
    arena: &mut crate::expr::ExprArena,
    ty: thorn_types::QualifiedType,
    span: thorn_ir::Span,
) -> ExprId {
    match property {
        Some((property, direct_access_permitted, owner_requires_vtable_dispatch)) => {
            match lower_property(property, direct_access_permitted, owner_requires_vtable_dispatch, true) {
                PropertyLowering::DirectField(field) => {
                    let target = arena.alloc(Expr { kind: ExprKind::LValue { defn: field, base: None }, ty, span });
                    arena.alloc(Expr { kind: ExprKind::Assign { target: Box::new(target), value: Box::new(value) }, ty, span })
                }
                PropertyLowering::Call { accessor, .. } => {
                    arena.alloc(Expr { kind: ExprKind::FnCall { callee: accessor, args: vec![value] }, ty, span })
                }
            }
        }
        None => {
            let target = arena.alloc(Expr { kind: target_kind, ty, span });
            arena.alloc(Expr { kind: ExprKind::Assign { target: Box::new(target), value: Box::new(value) }, ty, span })
        }
    }
}

#[must_use]
pub fn enclosing_function_allows_direct_member_access(enclosing: Option<&Defn>, owning_composite: DefnId) -> bool {
    let Some(defn) = enclosing else { return false };
    matches!(&defn.kind, DefnKind::Function(_)) && defn.parent == Some(owning_composite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use thorn_types::Idx;

    fn property(is_final: bool) -> PropertyDefn {
        PropertyDefn { ty: Idx(0), getter: Some(DefnId(1)), setter: Some(DefnId(2)), backing_field: Some(DefnId(3)), is_final }
    }

    #[test]
    fn final_property_with_direct_access_reads_backing_field() {
        let prop = property(true);
        let lowering = lower_property(&prop, true, false, false);
        assert!(matches!(lowering, PropertyLowering::DirectField(DefnId(3))));
    }

    #[test]
    fn non_final_property_always_dispatches_virtually() {
        let prop = property(false);
        let lowering = lower_property(&prop, true, false, false);
        assert!(matches!(lowering, PropertyLowering::Call { virtual_dispatch: true, .. }));
    }

    #[test]
    fn final_property_without_direct_access_permission_still_calls_accessor() {
        let prop = property(true);
        let lowering = lower_property(&prop, false, false, false);
        assert!(matches!(lowering, PropertyLowering::Call { .. }));
    }
}
