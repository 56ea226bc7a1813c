//! The type lattice's variant set (§3 "Types (the lattice)").

use smallvec::SmallVec;
use thorn_ir::{DefnId, Name};

use crate::qualifier::Qualifiers;

/// Handle into a [`crate::Pool`]. Two `Idx`s compare equal iff they name
/// the same canonical type object — for interned kinds (`Tuple`, `Union`,
/// `Function`, `NativeArray`, `Address`, `FlexibleArray`, `UnitType`) this
/// is enforced by construction; for `Composite`/`Enum` it follows from
/// being keyed on the owning [`DefnId`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct Idx(pub u32);

/// A type together with its use-site qualifiers.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct QualifiedType {
    pub ty: Idx,
    pub qualifiers: Qualifiers,
}

impl QualifiedType {
    #[must_use]
    pub fn unqualified(ty: Idx) -> Self {
        QualifiedType { ty, qualifiers: Qualifiers::empty() }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimitiveKind {
    Void,
    Null,
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Float,
    Double,
    /// Transient type of an as-yet-unsized integer literal; only ever
    /// appears during inference and must be resolved before a type is
    /// singular.
    UnsizedInt,
}

impl PrimitiveKind {
    #[must_use]
    pub fn is_integer(self) -> bool {
        use PrimitiveKind::{I16, I32, I64, I8, U16, U32, U64, U8};
        matches!(self, I8 | I16 | I32 | I64 | U8 | U16 | U32 | U64)
    }

    #[must_use]
    pub fn is_signed(self) -> bool {
        use PrimitiveKind::{I16, I32, I64, I8};
        matches!(self, I8 | I16 | I32 | I64)
    }

    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, PrimitiveKind::Float | PrimitiveKind::Double)
    }

    #[must_use]
    pub fn bit_width(self) -> Option<u32> {
        use PrimitiveKind::{Bool, Char, Double, Float, I16, I32, I64, I8, U16, U32, U64, U8};
        Some(match self {
            Bool | I8 | U8 => 8,
            I16 | U16 => 16,
            Char | I32 | U32 | Float => 32,
            I64 | U64 | Double => 64,
            _ => return None,
        })
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompositeKind {
    Class,
    Struct,
    Interface,
    Protocol,
}

impl CompositeKind {
    /// Whether instances of this composite kind are reference types
    /// (heap-allocated, passed by pointer) as opposed to value types.
    #[must_use]
    pub fn is_reference_kind(self) -> bool {
        matches!(self, CompositeKind::Class | CompositeKind::Interface | CompositeKind::Protocol)
    }
}

bitflags::bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ParamFlags: u8 {
        const VARIADIC      = 1 << 0;
        const REFERENCE     = 1 << 1;
        const LVALUE_PARAM  = 1 << 2;
        const KEYWORD_ONLY  = 1 << 3;
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionParam {
    pub name: Name,
    pub ty: Idx,
    pub has_default: bool,
    pub flags: ParamFlags,
    pub variance: Variance,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionTypeData {
    pub params: Vec<FunctionParam>,
    pub return_type: Idx,
    /// `Some` iff this is a method type (non-static); carries the self
    /// parameter's qualified type.
    pub self_param: Option<Idx>,
    pub is_static: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeVarConstraint {
    IsInstance,
    IsSubtype,
    IsSupertype,
    IsQualifier,
    IsTypeCtor,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeVarData {
    pub name: Name,
    pub constraint: TypeVarConstraint,
    pub bound: Option<Idx>,
}

/// The closed variant set of types (§3).
///
/// This is the data actually stored in the [`crate::Pool`]; callers get it
/// back by reference from `Pool::kind`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    /// A class/struct/interface/protocol, identified by its owning defn.
    /// Super type, interfaces, fields, and method table live in
    /// `thorn_defn`, not here — see the crate-level note on breaking the
    /// Type <-> Defn cycle via `DefnId`.
    Composite { defn: DefnId, kind: CompositeKind },
    /// An enum, identified by its owning defn; base integer type and
    /// ordered constants live in `thorn_defn`.
    Enum { defn: DefnId, base: Idx },
    Function(FunctionTypeData),
    Tuple(Vec<Idx>),
    /// Canonicalized (sorted, deduplicated) union members, plus the
    /// precomputed `hasRefTypesOnly` flag distinguishing a pointer-only
    /// union (representable as a plain nullable reference) from a tagged
    /// union requiring a discriminant.
    Union { members: Vec<Idx>, has_ref_types_only: bool },
    NativeArray { element: Idx, length: u64 },
    Address(Idx),
    FlexibleArray(Idx),
    TypeAlias(Idx),
    TypeVariable(TypeVarData),
}

impl TypeKind {
    #[must_use]
    pub fn is_union(&self) -> bool {
        matches!(self, TypeKind::Union { .. })
    }

    #[must_use]
    pub fn is_type_variable(&self) -> bool {
        matches!(self, TypeKind::TypeVariable(_))
    }
}

/// Canonicalizes a union's member list: sort by a stable key, dedup, and
/// compute `hasRefTypesOnly`.
///
/// `is_ref_only` classifies a member `Idx` as a pure (non-null,
/// non-primitive) reference type; callers pass a closure backed by the
/// pool since this module has no pool access of its own.
pub fn canonicalize_union(mut members: SmallVec<[Idx; 4]>, is_ref_only: impl Fn(Idx) -> bool) -> (Vec<Idx>, bool) {
    members.sort_by_key(|idx| idx.0);
    members.dedup();
    let has_ref_types_only = members.iter().all(|m| is_ref_only(*m));
    (members.into_vec(), has_ref_types_only)
}
