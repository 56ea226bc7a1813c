//! Drives `beginPass`/`finishPass` over a host's defn graph, tracking the
//! call stack for cycle reconstruction and owning the deferred worklist.
//!
//! This crate never touches the concrete `Defn` type — the host (normally
//! `thorn_defn::Module`) is reached only through [`PassHost`], so this
//! crate stays a dependency leaf for the defn graph rather than the
//! reverse.

use thorn_ir::DefnId;

use crate::cycle::CallStack;
use crate::pass::{BeginOutcome, DefnPasses, Pass};
use crate::worklist::Worklist;

/// What a pass manager needs from its host to run passes over defns.
pub trait PassHost {
    fn defn_passes_mut(&mut self, defn: DefnId) -> &mut DefnPasses;
}

/// A cycle detected while analyzing `defn` for `pass`, with the full
/// chain of `(defn, pass)` frames that closes the loop.
#[derive(Debug)]
pub struct CycleError {
    pub defn: DefnId,
    pub pass: Pass,
    pub chain: Vec<(DefnId, Pass)>,
}

pub struct PassManager {
    stack: CallStack,
    worklist: Worklist,
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PassManager {
    #[must_use]
    pub fn new() -> Self {
        PassManager { stack: CallStack::new(), worklist: Worklist::new() }
    }

    #[must_use]
    pub fn worklist_mut(&mut self) -> &mut Worklist {
        &mut self.worklist
    }

    /// Ensures `pass` has run on `defn`, invoking `run` to perform the
    /// actual analysis body if and only if the pass hasn't already run or
    /// started running. Mirrors §4.2's `beginPass`/`finishPass` pair.
    ///
    /// `run` receives `&mut self`'s host back so it can recursively call
    /// `analyze_defn` again for dependencies.
    pub fn analyze_defn<H: PassHost>(
        &mut self,
        host: &mut H,
        defn: DefnId,
        pass: Pass,
        run: impl FnOnce(&mut H, &mut PassManager),
    ) -> Result<(), CycleError> {
        match host.defn_passes_mut(defn).begin(pass) {
            BeginOutcome::Done => Ok(()),
            BeginOutcome::Cycle => {
                let chain = self.stack.chain_ending_at(defn, pass).map(<[_]>::to_vec).unwrap_or_default();
                Err(CycleError { defn, pass, chain })
            }
            BeginOutcome::Proceed => {
                self.stack.push(defn, pass);
                run(host, self);
                self.stack.pop();
                host.defn_passes_mut(defn).finish(pass);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    struct FakeHost {
        passes: FxHashMap<DefnId, DefnPasses>,
    }

    impl PassHost for FakeHost {
        fn defn_passes_mut(&mut self, defn: DefnId) -> &mut DefnPasses {
            self.passes.entry(defn).or_default()
        }
    }

    #[test]
    fn analyze_defn_runs_body_exactly_once() {
        let mut host = FakeHost { passes: FxHashMap::default() };
        let mut manager = PassManager::new();
        let mut run_count = 0;
        manager.analyze_defn(&mut host, DefnId(1), Pass::FieldPass, |_, _| run_count += 1).unwrap();
        manager.analyze_defn(&mut host, DefnId(1), Pass::FieldPass, |_, _| run_count += 1).unwrap();
        assert_eq!(run_count, 1);
    }

    #[test]
    fn self_recursive_pass_is_reported_as_cycle() {
        let mut host = FakeHost { passes: FxHashMap::default() };
        let mut manager = PassManager::new();
        let result = manager.analyze_defn(&mut host, DefnId(1), Pass::BaseTypesPass, |host, manager| {
            let inner = manager.analyze_defn(host, DefnId(1), Pass::BaseTypesPass, |_, _| {});
            assert!(inner.is_err());
        });
        assert!(result.is_ok());
    }

    #[test]
    fn deferred_tasks_can_be_queued_and_drained() {
        let mut manager = PassManager::new();
        manager.worklist_mut().push(DefnId(5), Pass::ReflectionPass);
        assert_eq!(manager.worklist_mut().len(), 1);
    }
}
