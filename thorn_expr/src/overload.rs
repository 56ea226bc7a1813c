//! Overload resolution (§4.3 "Overload resolution").

use rustc_hash::FxHashMap;
use thorn_diagnostic::{Diagnostic, ErrorCode};
use thorn_ir::{DefnId, Name, Span};
use thorn_types::{ConversionRank, CompositeLookup, Idx, Pool};

/// One candidate function under consideration for a call, with its
/// argument-to-parameter mapping already resolved (positional, keyword,
/// variadic packing, and defaulted trailing parameters).
#[derive(Clone, Debug)]
pub struct CallCandidate {
    pub defn: DefnId,
    /// Parameter types in call order, aligned 1:1 with `arg_types`
    /// passed to `rank_candidate`.
    pub param_types: Vec<Idx>,
    pub uses_variadic_packing: bool,
    pub defaulted_trailing: usize,
}

/// The per-argument ranks computed for one candidate, plus its derived
/// candidate rank (the minimum across arguments, per step 4).
#[derive(Clone, Debug)]
pub struct RankedCandidate {
    pub candidate: CallCandidate,
    pub arg_ranks: Vec<ConversionRank>,
    pub candidate_rank: ConversionRank,
}

/// Computes the per-argument ranks and the overall candidate rank
/// (minimum across arguments — one bad argument sinks the whole
/// candidate, step 4).
#[must_use]
pub fn rank_candidate(pool: &Pool, lookup: &impl CompositeLookup, candidate: CallCandidate, arg_types: &[Idx]) -> RankedCandidate {
    let arg_ranks: Vec<ConversionRank> =
        candidate.param_types.iter().zip(arg_types.iter()).map(|(param, arg)| thorn_types::is_assignable(pool, lookup, *arg, *param)).collect();
    let candidate_rank = arg_ranks.iter().copied().min().unwrap_or(ConversionRank::IdenticalTypes);
    RankedCandidate { candidate, arg_ranks, candidate_rank }
}

/// Whether `a` is *more specific* than `b`: every parameter type of `a`
/// is a subtype (assignable) of the corresponding parameter of `b`
/// (step 6).
#[must_use]
fn is_more_specific(pool: &Pool, lookup: &impl CompositeLookup, a: &CallCandidate, b: &CallCandidate) -> bool {
    if a.param_types.len() != b.param_types.len() {
        return false;
    }
    let mut any_strictly_tighter = false;
    for (pa, pb) in a.param_types.iter().zip(b.param_types.iter()) {
        if pa == pb {
            continue;
        }
        let rank = thorn_types::is_assignable(pool, lookup, *pa, *pb);
        if !rank.is_viable() {
            return false;
        }
        any_strictly_tighter = true;
    }
    any_strictly_tighter
}

#[derive(Debug)]
pub enum OverloadOutcome {
    Resolved(DefnId),
    NoMatch,
    Ambiguous(Vec<RankedCandidate>),
}

/// Runs the full resolution algorithm (steps 3-7) over an already-culled
/// (by arity/keyword matching) candidate set.
#[must_use]
pub fn resolve(pool: &Pool, lookup: &impl CompositeLookup, candidates: Vec<CallCandidate>, arg_types: &[Idx]) -> OverloadOutcome {
    let ranked: Vec<RankedCandidate> =
        candidates.into_iter().map(|c| rank_candidate(pool, lookup, c, arg_types)).filter(|r| r.candidate_rank.is_viable()).collect();

    if ranked.is_empty() {
        return OverloadOutcome::NoMatch;
    }

    let best_rank = ranked.iter().map(|r| r.candidate_rank).max().unwrap();
    let mut survivors: Vec<RankedCandidate> = ranked.into_iter().filter(|r| r.candidate_rank == best_rank).collect();

    if survivors.len() > 1 {
        let dominated: Vec<bool> = survivors
            .iter()
            .enumerate()
            .map(|(i, candidate)| survivors.iter().enumerate().any(|(j, other)| i != j && is_more_specific(pool, lookup, &other.candidate, &candidate.candidate)))
            .collect();
        let mut kept = Vec::new();
        for (survivor, is_dominated) in survivors.into_iter().zip(dominated) {
            if !is_dominated {
                kept.push(survivor);
            }
        }
        survivors = kept;
    }

    match survivors.len() {
        1 => OverloadOutcome::Resolved(survivors.into_iter().next().unwrap().candidate.defn),
        0 => OverloadOutcome::NoMatch,
        _ => OverloadOutcome::Ambiguous(survivors),
    }
}

/// Renders the `E_AmbiguousCall` diagnostic listing every surviving
/// candidate with its rank, per §4.3's tie-break reporting requirement.
#[must_use]
pub fn ambiguous_call_diagnostic(span: Span, name: Name, name_text: &str, survivors: &[RankedCandidate]) -> Diagnostic {
    let mut diag = Diagnostic::error(ErrorCode::AmbiguousCall, span, format!("ambiguous call to `{name_text}`"));
    let _ = name;
    for survivor in survivors {
        diag = diag.with_label(span, format!("candidate defn {:?} at rank {:?}", survivor.candidate.defn, survivor.candidate_rank));
    }
    diag
}

/// Builds the argument mapping for one candidate: positional arguments
/// bind to parameters index-for-index, named arguments (`named` maps an
/// argument's label to its position in the call's argument list) bind
/// by matching `param_names`, variadic parameters pack all remaining
/// positional arguments into a tuple, and default values supply trailing
/// parameters not otherwise bound. The returned `param_types` is ordered
/// to match the call's own argument order, so the caller can zip it
/// against that call's `arg_types` unchanged.
#[must_use]
pub fn bind_arguments(
    param_types: &[Idx],
    param_names: &[Name],
    has_default: &[bool],
    variadic_param: Option<usize>,
    positional_count: usize,
    named: &FxHashMap<Name, usize>,
) -> Option<CallCandidate> {
    if let Some(variadic_idx) = variadic_param {
        if positional_count > variadic_idx {
            if !named.is_empty() {
                return None;
            }
            return Some(CallCandidate {
                defn: DefnId(0),
                param_types: param_types.to_vec(),
                uses_variadic_packing: true,
                defaulted_trailing: 0,
            });
        }
    }

    if positional_count > param_types.len() {
        return None;
    }

    let mut bound = vec![false; param_types.len()];
    bound.iter_mut().take(positional_count).for_each(|slot| *slot = true);

    let mut named_by_call_order: Vec<(usize, Idx)> = Vec::with_capacity(named.len());
    for (&label, &call_index) in named {
        let param_index = param_names.iter().position(|&n| n == label)?;
        if param_index < positional_count || bound[param_index] {
            return None;
        }
        bound[param_index] = true;
        named_by_call_order.push((call_index, param_types[param_index]));
    }
    named_by_call_order.sort_by_key(|&(call_index, _)| call_index);

    let all_bound_or_defaulted = bound.iter().zip(has_default.iter()).all(|(&is_bound, &has_default)| is_bound || has_default);
    if !all_bound_or_defaulted {
        return None;
    }
    let defaulted_trailing = bound.iter().filter(|&&is_bound| !is_bound).count();

    let mut ordered_param_types: Vec<Idx> = param_types[..positional_count].to_vec();
    ordered_param_types.extend(named_by_call_order.into_iter().map(|(_, ty)| ty));

    Some(CallCandidate { defn: DefnId(0), param_types: ordered_param_types, uses_variadic_packing: false, defaulted_trailing })
}

#[cfg(test)]
mod tests {
    use super::*;
    use thorn_types::{CompositeKind, PrimitiveKind};

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

    #[test]
    fn exact_match_wins_over_widening_conversion() {
        let pool = Pool::new();
        let lookup = NoComposites;
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let float_ty = pool.primitive(PrimitiveKind::Float);
        let int_candidate = CallCandidate { defn: DefnId(1), param_types: vec![i32_ty], uses_variadic_packing: false, defaulted_trailing: 0 };
        let float_candidate =
            CallCandidate { defn: DefnId(2), param_types: vec![float_ty], uses_variadic_packing: false, defaulted_trailing: 0 };
        let outcome = resolve(&pool, &lookup, vec![int_candidate, float_candidate], &[i32_ty]);
        assert!(matches!(outcome, OverloadOutcome::Resolved(DefnId(1))));
    }

    #[test]
    fn incompatible_candidates_are_culled_before_ranking() {
        let pool = Pool::new();
        let lookup = NoComposites;
        let bool_ty = pool.primitive(PrimitiveKind::Bool);
        let void_ty = pool.primitive(PrimitiveKind::Void);
        let candidate = CallCandidate { defn: DefnId(1), param_types: vec![bool_ty], uses_variadic_packing: false, defaulted_trailing: 0 };
        let outcome = resolve(&pool, &lookup, vec![candidate], &[void_ty]);
        assert!(matches!(outcome, OverloadOutcome::NoMatch));
    }

    #[test]
    fn equally_ranked_unrelated_candidates_are_ambiguous() {
        let mut pool = Pool::new();
        let lookup = NoComposites;
        let tuple_a = pool.intern_tuple(vec![pool.primitive(PrimitiveKind::I32)]);
        let tuple_b = pool.intern_tuple(vec![pool.primitive(PrimitiveKind::I32)]);
        // Force two distinct-but-equally-applicable candidates by giving
        // them identical param types; with equal specificity neither
        // dominates so both survive.
        let a = CallCandidate { defn: DefnId(1), param_types: vec![tuple_a], uses_variadic_packing: false, defaulted_trailing: 0 };
        let b = CallCandidate { defn: DefnId(2), param_types: vec![tuple_b], uses_variadic_packing: false, defaulted_trailing: 0 };
        let outcome = resolve(&pool, &lookup, vec![a, b], &[tuple_a]);
        assert!(matches!(outcome, OverloadOutcome::Ambiguous(_)));
    }

    #[test]
    fn variadic_binding_requires_enough_positional_args() {
        let has_default = [false];
        let result = bind_arguments(&[Idx(0)], &[Name::EMPTY], &has_default, Some(2), 1, &FxHashMap::default());
        assert!(result.is_none());
    }

    #[test]
    fn missing_trailing_args_fall_back_to_defaults() {
        let has_default = [false, true];
        let names = [Name::EMPTY, Name::EMPTY];
        let result = bind_arguments(&[Idx(0), Idx(1)], &names, &has_default, None, 1, &FxHashMap::default());
        assert!(result.is_some());
        assert_eq!(result.unwrap().defaulted_trailing, 1);
    }

    #[test]
    fn keyword_argument_binds_to_the_matching_parameter_out_of_order() {
        let interner = thorn_ir::NameInterner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let i32_ty = Pool::new().primitive(PrimitiveKind::I32);
        let names = [a, b];
        let has_default = [false, false];

        let mut named = FxHashMap::default();
        named.insert(b, 0);
        let result = bind_arguments(&[i32_ty, i32_ty], &names, &has_default, None, 0, &named);
        assert!(result.is_none(), "one positional slot still unbound");

        let mut named = FxHashMap::default();
        named.insert(b, 1);
        let result = bind_arguments(&[i32_ty, i32_ty], &names, &has_default, None, 1, &named);
        assert!(result.is_some());
    }

    #[test]
    fn unknown_keyword_label_does_not_match_any_parameter() {
        let interner = thorn_ir::NameInterner::new();
        let a = interner.intern("a");
        let unknown = interner.intern("unknown");
        let i32_ty = Pool::new().primitive(PrimitiveKind::I32);
        let names = [a];
        let has_default = [false];
        let mut named = FxHashMap::default();
        named.insert(unknown, 0);
        let result = bind_arguments(&[i32_ty], &names, &has_default, None, 0, &named);
        assert!(result.is_none());
    }
}
