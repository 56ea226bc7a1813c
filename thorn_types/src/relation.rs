//! Type relations: equality, subtyping, and assignability.
//!
//! Composite supertype/interface queries require knowledge this crate
//! doesn't own (the defn graph lives in `thorn_defn`, which in turn
//! depends on `thorn_types` for `Idx`). To avoid a crate cycle, composite
//! relations are expressed against the [`CompositeLookup`] trait; the
//! concrete defn graph implements it downstream.

use thorn_ir::DefnId;

use crate::pool::Pool;
use crate::qualifier::Qualifiers;
use crate::rank::{Cast, ConversionRank};
use crate::ty::{CompositeKind, Idx, PrimitiveKind, TypeKind};

/// Supplies the composite-hierarchy facts that `thorn_defn` owns.
pub trait CompositeLookup {
    /// The immediate superclass of `defn`, if any (interfaces/protocols
    /// never have one).
    fn super_of(&self, defn: DefnId) -> Option<DefnId>;

    /// All interfaces/protocols `defn` declares conformance to, direct or
    /// inherited.
    fn interfaces_of(&self, defn: DefnId) -> &[DefnId];

    fn composite_kind(&self, defn: DefnId) -> CompositeKind;
}

/// Structural/nominal equality: two `Idx`s name the same type iff the
/// pool interned them to the same slot (composites and enums included,
/// since those are nominally keyed).
#[must_use]
pub fn is_equal(pool: &Pool, a: Idx, b: Idx) -> bool {
    pool.dealias(a) == pool.dealias(b)
}

/// Whether `defn` is `ancestor` or inherits from it, transitively.
#[must_use]
pub fn is_subclass(lookup: &impl CompositeLookup, defn: DefnId, ancestor: DefnId) -> bool {
    if defn == ancestor {
        return true;
    }
    let mut current = lookup.super_of(defn);
    while let Some(parent) = current {
        if parent == ancestor {
            return true;
        }
        current = lookup.super_of(parent);
    }
    false
}

#[must_use]
pub fn conforms_to_interface(lookup: &impl CompositeLookup, defn: DefnId, interface: DefnId) -> bool {
    if lookup.interfaces_of(defn).contains(&interface) {
        return true;
    }
    let mut current = lookup.super_of(defn);
    while let Some(parent) = current {
        if lookup.interfaces_of(parent).contains(&interface) {
            return true;
        }
        current = lookup.super_of(parent);
    }
    false
}

/// Computes the conversion rank for assigning a value of type `from` to a
/// slot of type `to`, ignoring qualifiers (see [`Qualifiers::is_assignable_to`]
/// for the orthogonal qualifier check callers must also perform).
#[must_use]
pub fn is_assignable(pool: &Pool, lookup: &impl CompositeLookup, from: Idx, to: Idx) -> ConversionRank {
    let from = pool.dealias(from);
    let to = pool.dealias(to);
    if from == to {
        return ConversionRank::IdenticalTypes;
    }
    match (pool.kind(from), pool.kind(to)) {
        (TypeKind::Primitive(a), TypeKind::Primitive(b)) => primitive_rank(*a, *b),
        (TypeKind::Composite { defn: from_defn, .. }, TypeKind::Composite { defn: to_defn, .. }) => {
            let to_kind = lookup.composite_kind(*to_defn);
            if to_kind == CompositeKind::Interface || to_kind == CompositeKind::Protocol {
                if conforms_to_interface(lookup, *from_defn, *to_defn) {
                    ConversionRank::ExactConversion
                } else {
                    ConversionRank::Incompatible
                }
            } else if is_subclass(lookup, *from_defn, *to_defn) {
                ConversionRank::ExactConversion
            } else {
                ConversionRank::Incompatible
            }
        }
        (TypeKind::Union { members, .. }, _) => {
            // Assignable from a union only if every member is assignable.
            let mut worst = ConversionRank::IdenticalTypes;
            for member in members {
                let rank = is_assignable(pool, lookup, *member, to);
                if !rank.is_viable() {
                    return ConversionRank::Incompatible;
                }
                worst = worst.min(rank);
            }
            worst
        }
        (_, TypeKind::Union { members, .. }) => {
            // Assignable into a union if assignable to any one member.
            members
                .iter()
                .map(|member| is_assignable(pool, lookup, from, *member))
                .filter(|r| r.is_viable())
                .max()
                .unwrap_or(ConversionRank::Incompatible)
        }
        _ => ConversionRank::Incompatible,
    }
}

fn primitive_rank(from: PrimitiveKind, to: PrimitiveKind) -> ConversionRank {
    if from == to {
        return ConversionRank::IdenticalTypes;
    }
    // An unsized integer literal hasn't committed to a width yet: it binds
    // to any integer width at `ExactConversion` (the eventual width is
    // chosen by inference, not by this rank) and to a float type only at
    // `NonPreferred`, so an integer overload wins a tie against a float
    // overload presented with the same literal.
    if from == PrimitiveKind::UnsizedInt {
        return if to.is_integer() {
            ConversionRank::ExactConversion
        } else if to.is_float() {
            ConversionRank::NonPreferred
        } else if to == PrimitiveKind::Bool {
            ConversionRank::IntegerToBool
        } else {
            ConversionRank::Incompatible
        };
    }
    if to == PrimitiveKind::Bool {
        return if from.is_integer() || from.is_float() {
            ConversionRank::IntegerToBool
        } else {
            ConversionRank::Incompatible
        };
    }
    match (from.is_integer(), to.is_integer()) {
        (true, true) => {
            let from_width = from.bit_width().unwrap_or(0);
            let to_width = to.bit_width().unwrap_or(0);
            if from.is_signed() != to.is_signed() && from_width == to_width {
                ConversionRank::SignedUnsigned
            } else if to_width >= from_width {
                ConversionRank::ExactConversion
            } else {
                ConversionRank::Truncation
            }
        }
        (true, false) if to.is_float() => ConversionRank::ExactConversion,
        (false, true) if from.is_float() => ConversionRank::Truncation,
        (false, false) if from.is_float() && to.is_float() => {
            if to.bit_width().unwrap_or(0) >= from.bit_width().unwrap_or(0) {
                ConversionRank::ExactConversion
            } else {
                ConversionRank::Truncation
            }
        }
        _ => ConversionRank::Incompatible,
    }
}

/// Decides which [`Cast`] variant realizes an assignment already found
/// viable by [`is_assignable`]. Returns `None` for `IdenticalTypes` (no
/// cast needed) or `Incompatible` (caller's bug if reached).
#[must_use]
pub fn conversion_cast(pool: &Pool, lookup: &impl CompositeLookup, from: Idx, to: Idx, rank: ConversionRank) -> Option<Cast> {
    if rank == ConversionRank::IdenticalTypes || rank == ConversionRank::Incompatible {
        return None;
    }
    let from = pool.dealias(from);
    let to = pool.dealias(to);
    match (pool.kind(from), pool.kind(to)) {
        (TypeKind::Primitive(a), TypeKind::Primitive(b)) => Some(primitive_cast(*a, *b)),
        (TypeKind::Composite { defn: from_defn, .. }, TypeKind::Composite { defn: to_defn, .. }) => {
            let to_kind = lookup.composite_kind(*to_defn);
            if matches!(to_kind, CompositeKind::Interface | CompositeKind::Protocol) {
                Some(Cast::UpCast)
            } else if is_subclass(lookup, *from_defn, *to_defn) {
                Some(Cast::UpCast)
            } else {
                Some(Cast::TryCast)
            }
        }
        (_, TypeKind::Union { .. }) => Some(Cast::UnionCtorCast),
        (TypeKind::Union { .. }, _) => Some(Cast::UnionMemberCast),
        _ => None,
    }
}

fn primitive_cast(from: PrimitiveKind, to: PrimitiveKind) -> Cast {
    if to == PrimitiveKind::Bool {
        return Cast::NonZeroCompare;
    }
    match (from.is_integer(), to.is_integer()) {
        (true, true) => {
            let from_width = from.bit_width().unwrap_or(0);
            let to_width = to.bit_width().unwrap_or(0);
            if to_width < from_width {
                Cast::Truncate
            } else if from.is_signed() {
                Cast::SignExtend
            } else {
                Cast::ZeroExtend
            }
        }
        (true, false) => Cast::IntToFloat,
        (false, true) => Cast::FloatToInt,
        _ => Cast::BitCast,
    }
}

/// Whether `q` qualifiers are compatible with qualifiers `to` at an
/// assignment site; thin wrapper kept here so relation checks at call
/// sites don't need to import `qualifier` separately.
#[must_use]
pub fn qualifiers_compatible(from: Qualifiers, to: Qualifiers) -> bool {
    from.is_assignable_to(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Pool;

    struct NoComposites;
    impl CompositeLookup for NoComposites {
        fn super_of(&self, _defn: DefnId) -> Option<DefnId> {
            None
        }
        fn interfaces_of(&self, _defn: DefnId) -> &[DefnId] {
            &[]
        }
        fn composite_kind(&self, _defn: DefnId) -> CompositeKind {
            CompositeKind::Class
        }
    }

    struct LinearHierarchy;
    impl CompositeLookup for LinearHierarchy {
        fn super_of(&self, defn: DefnId) -> Option<DefnId> {
            match defn.0 {
                2 => Some(DefnId(1)),
                3 => Some(DefnId(2)),
                _ => None,
            }
        }
        fn interfaces_of(&self, _defn: DefnId) -> &[DefnId] {
            &[]
        }
        fn composite_kind(&self, _defn: DefnId) -> CompositeKind {
            CompositeKind::Class
        }
    }

    #[test]
    fn widening_int_conversion_is_exact() {
        let pool = Pool::new();
        let lookup = NoComposites;
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let i64_ty = pool.primitive(PrimitiveKind::I64);
        assert_eq!(is_assignable(&pool, &lookup, i32_ty, i64_ty), ConversionRank::ExactConversion);
    }

    #[test]
    fn narrowing_int_conversion_is_truncation() {
        let pool = Pool::new();
        let lookup = NoComposites;
        let i64_ty = pool.primitive(PrimitiveKind::I64);
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        assert_eq!(is_assignable(&pool, &lookup, i64_ty, i32_ty), ConversionRank::Truncation);
    }

    #[test]
    fn same_width_sign_change_is_signed_unsigned() {
        let pool = Pool::new();
        let lookup = NoComposites;
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let u32_ty = pool.primitive(PrimitiveKind::U32);
        assert_eq!(is_assignable(&pool, &lookup, i32_ty, u32_ty), ConversionRank::SignedUnsigned);
    }

    #[test]
    fn transitive_subclass_is_detected() {
        let lookup = LinearHierarchy;
        assert!(is_subclass(&lookup, DefnId(3), DefnId(1)));
        assert!(!is_subclass(&lookup, DefnId(1), DefnId(3)));
    }

    #[test]
    fn union_member_assignability_is_covering() {
        let mut pool = Pool::new();
        let lookup = NoComposites;
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let bool_ty = pool.primitive(PrimitiveKind::Bool);
        let union = pool.intern_union(vec![i32_ty, bool_ty], false);
        assert!(is_assignable(&pool, &lookup, i32_ty, union).is_viable());
    }

    #[test]
    fn unsized_literal_prefers_integer_over_float() {
        let pool = Pool::new();
        let lookup = NoComposites;
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let float_ty = pool.primitive(PrimitiveKind::Float);
        let unsized_ty = pool.primitive(PrimitiveKind::UnsizedInt);
        let int_rank = is_assignable(&pool, &lookup, unsized_ty, i32_ty);
        let float_rank = is_assignable(&pool, &lookup, unsized_ty, float_ty);
        assert!(int_rank > float_rank);
    }

    #[test]
    fn unrelated_primitives_are_incompatible() {
        let pool = Pool::new();
        let lookup = NoComposites;
        let bool_ty = pool.primitive(PrimitiveKind::Bool);
        let void_ty = pool.primitive(PrimitiveKind::Void);
        assert_eq!(is_assignable(&pool, &lookup, void_ty, bool_ty), ConversionRank::Incompatible);
    }

    #[test]
    fn int_to_bool_cast_is_a_nonzero_compare_not_a_float_conversion() {
        let pool = Pool::new();
        let lookup = NoComposites;
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let bool_ty = pool.primitive(PrimitiveKind::Bool);
        let rank = is_assignable(&pool, &lookup, i32_ty, bool_ty);
        assert_eq!(conversion_cast(&pool, &lookup, i32_ty, bool_ty, rank), Some(Cast::NonZeroCompare));
    }
}
