//! Constraint propagation and resolution (§4.4 steps 2-5).

use rustc_hash::FxHashMap;
use thiserror::Error;
use thorn_types::{is_assignable, CompositeLookup, ConversionRank, Idx, Pool};

use crate::constraint::{Candidates, TypingVar};

#[derive(Error, Debug, Eq, PartialEq)]
pub enum InferError {
    #[error("no consistent type assignment for typing variable {0:?}")]
    NoConsistentAssignment(TypingVar),
    #[error("typing variable {0:?} remains ambiguous among equally-ranked candidates")]
    StillAmbiguous(TypingVar),
}

/// The fully-resolved type for every typing variable registered with the
/// engine, produced by [`InferenceEngine::resolve`].
#[derive(Default, Debug)]
pub struct Resolution {
    assignments: FxHashMap<TypingVar, Idx>,
}

impl Resolution {
    #[must_use]
    pub fn get(&self, var: TypingVar) -> Option<Idx> {
        self.assignments.get(&var).copied()
    }
}

/// Accumulates typing variables and their candidate sets for one
/// expression (or one function body), then resolves them together.
#[derive(Default)]
pub struct InferenceEngine {
    candidates: FxHashMap<TypingVar, Candidates>,
}

impl InferenceEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Step 1: record a typing variable's initial candidate set (the
    /// unsized literal's permitted widths, an overload set's per-overload
    /// return types, or a template parameter's constraint-satisfying
    /// types).
    pub fn record_candidates(&mut self, var: TypingVar, options: Vec<Idx>) {
        self.candidates.insert(var, Candidates::new(options));
    }

    /// Step 2: constrains a variable against an expected type, keeping
    /// only candidates that are assignable to it (an `Incompatible` rank
    /// is dropped; everything else survives, so a `Truncation` candidate
    /// is kept for later tie-breaking rather than silently preferred).
    pub fn constrain_expected(&mut self, pool: &Pool, lookup: &dyn CompositeLookup, var: TypingVar, expected: Idx) {
        if let Some(candidates) = self.candidates.get_mut(&var) {
            candidates.narrow(|candidate| is_assignable(pool, lookup, candidate, expected) != ConversionRank::Incompatible);
        }
    }

    /// Steps 3-5: iteratively narrows every variable to a single
    /// candidate. Variables with one candidate left are fixed first;
    /// anything still ambiguous after the fixpoint is resolved by
    /// preferring the highest-ranked candidate against every other
    /// variable's already-fixed candidates (the "propagate via the
    /// conversion ranker" step), and a tie among top-ranked candidates is
    /// reported rather than guessed at.
    pub fn resolve(mut self, pool: &Pool, lookup: &dyn CompositeLookup) -> Result<Resolution, InferError> {
        let mut resolution = Resolution::default();

        loop {
            let mut progressed = false;

            for (&var, candidates) in &self.candidates {
                if resolution.assignments.contains_key(&var) {
                    continue;
                }
                if candidates.is_empty() {
                    return Err(InferError::NoConsistentAssignment(var));
                }
                if let Some(sole) = candidates.sole() {
                    resolution.assignments.insert(var, sole);
                    progressed = true;
                }
            }

            if !progressed {
                break;
            }
        }

        let unresolved: Vec<TypingVar> = self
            .candidates
            .keys()
            .copied()
            .filter(|var| !resolution.assignments.contains_key(var))
            .collect();

        for var in unresolved {
            let candidates = self.candidates.remove(&var).expect("checked above");
            let chosen = pick_best_ranked(pool, lookup, candidates.options())?;
            resolution.assignments.insert(var, chosen);
        }

        Ok(resolution)
    }
}

/// Among candidates with no remaining expected-type pressure, ranks each
/// against every other candidate in the set (self-consistency) and keeps
/// whichever has the best worst-case rank; an outright tie is an error
/// rather than an arbitrary pick, matching "error if no consistent
/// assignment exists" for the case where two candidates are equally
/// preferable.
fn pick_best_ranked(pool: &Pool, lookup: &dyn CompositeLookup, options: &[Idx]) -> Result<Idx, InferError> {
    if options.len() == 1 {
        return Ok(options[0]);
    }

    let mut ranked: Vec<(Idx, ConversionRank)> = options
        .iter()
        .map(|&candidate| {
            let worst = options
                .iter()
                .filter(|&&other| other != candidate)
                .map(|&other| is_assignable(pool, lookup, candidate, other))
                .max()
                .unwrap_or(ConversionRank::IdenticalTypes);
            (candidate, worst)
        })
        .collect();

    ranked.sort_by_key(|(_, rank)| *rank);
    let best_rank = ranked.last().map(|(_, rank)| *rank).unwrap_or(ConversionRank::Incompatible);
    let mut winners = ranked.iter().filter(|(_, rank)| *rank == best_rank);
    let first = winners.next().map(|(idx, _)| *idx);
    let has_second = winners.next().is_some();

    match (first, has_second) {
        (Some(idx), false) => Ok(idx),
        (Some(_), true) => Err(InferError::StillAmbiguous(TypingVar(0))),
        (None, _) => Err(InferError::NoConsistentAssignment(TypingVar(0))),
    }
}
