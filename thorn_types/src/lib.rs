//! The Thorn type lattice: qualifier algebra, structural interning of
//! compound types, shape classification, and type-relation queries
//! (equality, subtyping, assignability, conversion ranking).
//!
//! Composite and enum types only carry a [`thorn_ir::DefnId`] handle —
//! the owning defn (fields, methods, supertype, interface list) lives in
//! `thorn_defn`, which depends on this crate for `Idx`. Relation queries
//! that need defn-graph facts are expressed against [`CompositeLookup`],
//! implemented downstream by `thorn_defn`.

mod pool;
mod qualifier;
mod rank;
mod relation;
mod shape;
mod ty;

pub use pool::Pool;
pub use qualifier::Qualifiers;
pub use rank::{Cast, ConversionRank};
pub use relation::{conforms_to_interface, conversion_cast, is_assignable, is_equal, is_subclass, qualifiers_compatible, CompositeLookup};
pub use shape::{classify as classify_shape, TypeShape, LARGE_VALUE_THRESHOLD};
pub use ty::{
    canonicalize_union, CompositeKind, FunctionParam, FunctionTypeData, Idx, ParamFlags, PrimitiveKind, QualifiedType, TypeKind,
    TypeVarConstraint, TypeVarData, Variance,
};
