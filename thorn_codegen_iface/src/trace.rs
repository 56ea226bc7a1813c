//! Trace tables (§6): the descriptor sequence a garbage collector walks to
//! find reference-bearing fields inside an otherwise-opaque object.
//!
//! Grounded on `createTraceTable`/`createTraceTableEntries`: a type with no
//! reference-bearing instance fields of its own has no trace table and
//! defers to its supertype's. Unlike the original, which emits a separate
//! descriptor per nested aggregate field, this flattens a composite's own
//! reference-bearing fields into a single descriptor — there is only ever
//! one instance-field scope to describe at this layer, so chaining
//! multiple descriptors per type buys nothing the backend needs.

use thorn_ir::DefnId;
use thorn_types::{Pool, TypeKind};

/// One trace table entry. `field_offsets` holds the byte offsets (within
/// the instance) of reference-typed fields this descriptor accounts for;
/// `is_final` marks the last descriptor of a table so the collector knows
/// when to stop walking.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TraceDescriptor {
    pub is_final: bool,
    pub count: u16,
    pub offset: u32,
    pub field_offsets: Vec<u32>,
}

/// `field_offset` is supplied by the caller (layout is a backend concern;
/// this crate only decides which fields are traced and in what order).
pub fn build_trace_table(
    composite: DefnId,
    module: &thorn_defn::Module,
    pool: &Pool,
    field_offset: impl Fn(DefnId) -> u32,
) -> Option<Vec<TraceDescriptor>> {
    let data = composite_data(composite, module);
    let own_offsets = reference_field_offsets(&data.fields, module, pool, &field_offset);

    if own_offsets.is_empty() {
        return match data.super_type {
            Some(super_type) => build_trace_table(super_type, module, pool, field_offset),
            None => None,
        };
    }

    Some(vec![TraceDescriptor {
        is_final: true,
        count: u16::try_from(own_offsets.len()).expect("field count fits in u16"),
        offset: 0,
        field_offsets: own_offsets,
    }])
}

fn reference_field_offsets(
    fields: &[DefnId],
    module: &thorn_defn::Module,
    pool: &Pool,
    field_offset: &impl Fn(DefnId) -> u32,
) -> Vec<u32> {
    fields
        .iter()
        .filter_map(|&field| {
            let var = match &module.get(field).kind {
                thorn_defn::DefnKind::Var(var) | thorn_defn::DefnKind::Let(var) => var,
                _ => return None,
            };
            contains_reference_type(var.ty, pool).then(|| field_offset(field))
        })
        .collect()
}

/// Whether a type's representation can contain a heap reference anywhere
/// in its layout, so the collector must trace through it.
fn contains_reference_type(ty: thorn_types::Idx, pool: &Pool) -> bool {
    match pool.kind(ty) {
        TypeKind::Composite { kind, .. } => kind.is_reference_kind(),
        TypeKind::Tuple(elements) => elements.iter().any(|&e| contains_reference_type(e, pool)),
        TypeKind::Union { members, .. } => members.iter().any(|&m| contains_reference_type(m, pool)),
        TypeKind::NativeArray { element, .. } | TypeKind::FlexibleArray(element) => contains_reference_type(*element, pool),
        TypeKind::TypeAlias(target) => contains_reference_type(*target, pool),
        TypeKind::Primitive(_) | TypeKind::Enum { .. } | TypeKind::Function(_) | TypeKind::Address(_) | TypeKind::TypeVariable(_) => false,
    }
}

fn composite_data(defn: DefnId, module: &thorn_defn::Module) -> &thorn_defn::CompositeData {
    match &module.get(defn).kind {
        thorn_defn::DefnKind::Typedef(typedef) => typedef.composite.as_ref().expect("build_trace_table called on a non-composite defn"),
        _ => panic!("build_trace_table called on a non-Typedef defn"),
    }
}
