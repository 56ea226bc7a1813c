//! Conversion ranking and the cast-kind vocabulary used by overload
//! resolution and by the constant evaluator's implicit-conversion sites.

/// A totally ordered ranking of how "good" an implicit conversion is.
/// Declaration order is the rank order: lower variants are preferred
/// over later ones. `Incompatible` is not really a rank — it signals no
/// conversion exists at all — but participates in `Ord` as the worst
/// outcome so candidate-culling code can use plain comparison.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ConversionRank {
    /// No conversion path exists.
    Incompatible,
    /// A narrowing numeric conversion that may lose precision.
    Truncation,
    /// Conversion between signed and unsigned integers of the same width.
    SignedUnsigned,
    /// Conversion from a numeric/pointer type to `Bool`.
    IntegerToBool,
    /// A conversion that is legal but not the "natural" one for this
    /// argument position (e.g. widening through an intermediate that
    /// skips a more specific overload).
    NonPreferred,
    /// A conversion that changes representation but loses no information
    /// (e.g. widening integer promotion, derived-to-base upcast).
    ExactConversion,
    /// The argument's type already equals the parameter's type.
    IdenticalTypes,
}

impl ConversionRank {
    #[must_use]
    pub fn is_viable(self) -> bool {
        self != ConversionRank::Incompatible
    }

    /// The better of two ranks, where `IdenticalTypes` is best.
    #[must_use]
    pub fn better_of(self, other: Self) -> Self {
        self.max(other)
    }
}

/// The concrete cast operation a [`ConversionRank`] resolves to. Building
/// the cast *expression node* is `thorn_expr`'s job; this enum only
/// records which operation applies, so `thorn_types` can answer "is this
/// assignable" without depending on the expression AST.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Cast {
    /// No-op: types are already identical modulo qualifiers.
    Identity,
    Truncate,
    SignExtend,
    ZeroExtend,
    IntToFloat,
    FloatToInt,
    /// Integer or float to `Bool`: the result is whether the operand is
    /// nonzero, not a numeric conversion.
    NonZeroCompare,
    /// Derived-composite-pointer to base-composite-pointer, statically
    /// known safe.
    UpCast,
    /// Base-to-derived or interface-to-concrete, requires a runtime check.
    TryCast,
    /// Cross-cast between unrelated interface/protocol types.
    DynamicCast,
    /// Qualifier-only cast (e.g. `Mutable T` to `Readonly T`).
    QualCast,
    /// Reinterpret bits without representation change (same size).
    BitCast,
    /// Wraps a singular value into a union's storage.
    UnionCtorCast,
    /// Projects a union value out to one of its members, assuming the
    /// active member is known statically.
    UnionMemberCast,
    /// Projects a union value out to one of its members with a runtime
    /// discriminant check.
    CheckedUnionMemberCast,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_types_is_the_best_rank() {
        assert!(ConversionRank::IdenticalTypes > ConversionRank::ExactConversion);
        assert!(ConversionRank::ExactConversion > ConversionRank::NonPreferred);
    }

    #[test]
    fn incompatible_is_never_viable() {
        assert!(!ConversionRank::Incompatible.is_viable());
        assert!(ConversionRank::Truncation.is_viable());
    }

    #[test]
    fn better_of_picks_the_higher_rank() {
        let better = ConversionRank::Truncation.better_of(ConversionRank::ExactConversion);
        assert_eq!(better, ConversionRank::ExactConversion);
    }
}
