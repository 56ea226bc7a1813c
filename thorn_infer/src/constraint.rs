//! Typing variables and their candidate sets (§4.4 step 1).
//!
//! A typing variable stands for any expression whose type `reduceExpr`
//! could not pin down on its own: an unsized integer literal, a bare
//! overloaded name not yet applied to a call, or an unbound template
//! parameter. Each one starts with a set of candidate types; inference
//! narrows that set until exactly one remains or resolution fails.

use thorn_types::Idx;

/// Identifies one typing variable within an [`crate::engine::InferenceEngine`]
/// run. Callers mint these (typically one per unsized `ExprId`) and keep
/// their own mapping back to whatever the variable actually denotes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypingVar(pub u32);

/// The still-possible types for one typing variable.
#[derive(Clone, Debug)]
pub struct Candidates {
    options: Vec<Idx>,
}

impl Candidates {
    #[must_use]
    pub fn new(options: Vec<Idx>) -> Self {
        Candidates { options }
    }

    #[must_use]
    pub fn options(&self) -> &[Idx] {
        &self.options
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// `Some` iff exactly one candidate remains.
    #[must_use]
    pub fn sole(&self) -> Option<Idx> {
        match self.options.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Removes every candidate `keep` rejects. Returns whether anything
    /// was removed, so callers can detect a fixpoint.
    pub fn narrow(&mut self, keep: impl Fn(Idx) -> bool) -> bool {
        let before = self.options.len();
        self.options.retain(|idx| keep(*idx));
        self.options.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sole_is_none_until_one_candidate_remains() {
        let mut candidates = Candidates::new(vec![Idx(1), Idx(2)]);
        assert_eq!(candidates.sole(), None);
        candidates.narrow(|idx| idx == Idx(1));
        assert_eq!(candidates.sole(), Some(Idx(1)));
    }

    #[test]
    fn narrow_reports_whether_anything_changed() {
        let mut candidates = Candidates::new(vec![Idx(1), Idx(2)]);
        assert!(!candidates.narrow(|_| true));
        assert!(candidates.narrow(|idx| idx == Idx(1)));
    }

    #[test]
    fn narrowing_to_nothing_leaves_an_empty_set() {
        let mut candidates = Candidates::new(vec![Idx(1)]);
        candidates.narrow(|idx| idx == Idx(2));
        assert!(candidates.is_empty());
    }
}
