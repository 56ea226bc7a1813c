//! The qualifier bitset and its algebra.

use bitflags::bitflags;

bitflags! {
    /// Qualifiers attached to a type at a use site. Qualifiers never
    /// affect structural equality of the underlying [`crate::Type`]; they
    /// only affect assignability (see [`Qualifiers::is_assignable_to`]).
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Qualifiers: u8 {
        const READONLY  = 1 << 0;
        const MUTABLE   = 1 << 1;
        const IMMUTABLE = 1 << 2;
        const ADOPTED   = 1 << 3;
        const VOLATILE  = 1 << 4;
    }
}

/// The three mutability qualifiers are mutually exclusive.
const MUTABILITY_MASK: Qualifiers =
    Qualifiers::READONLY.union(Qualifiers::MUTABLE).union(Qualifiers::IMMUTABLE);

impl Qualifiers {
    /// Checks the "mutually exclusive" rule for READONLY/MUTABLE/IMMUTABLE.
    /// `ADOPTED`/`VOLATILE` are orthogonal and never conflict.
    #[must_use]
    pub fn is_valid_combination(self) -> bool {
        (self & MUTABILITY_MASK).bits().count_ones() <= 1
    }

    /// Whether a value qualified with `self` may be used where a value
    /// qualified with `to` is expected, ignoring the underlying type.
    ///
    /// Per the qualifier algebra: `IMMUTABLE -> READONLY` and
    /// `MUTABLE -> READONLY` are allowed; `IMMUTABLE <-> MUTABLE` are not;
    /// anything is assignable to itself.
    #[must_use]
    pub fn is_assignable_to(self, to: Qualifiers) -> bool {
        if self == to {
            return true;
        }
        let self_mut = self & MUTABILITY_MASK;
        let to_mut = to & MUTABILITY_MASK;
        let mutability_ok = if to_mut == Qualifiers::READONLY {
            self_mut == Qualifiers::MUTABLE || self_mut == Qualifiers::IMMUTABLE || self_mut.is_empty()
        } else {
            self_mut == to_mut
        };
        // ADOPTED/VOLATILE must at least be present on the target if
        // required there; we don't allow silently dropping them.
        let orthogonal = to & !MUTABILITY_MASK;
        mutability_ok && (self & orthogonal) == orthogonal
    }
}
