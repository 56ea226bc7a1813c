//! The ordered pass set and the per-defn running/finished bitsets.

use bitflags::bitflags;

/// One analysis pass, in dependency order (§4.2). Earlier passes never
/// depend on later ones; a pass may request an earlier pass on a
/// *different* defn via [`crate::manager::PassManager::analyze_defn`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u16)]
pub enum Pass {
    ResolveImport = 0,
    ResolveModuleMembers = 1,
    BaseTypesPass = 2,
    FieldPass = 3,
    RecursiveFieldTypePass = 4,
    OverloadingPass = 5,
    AttributePass = 6,
    ParameterTypePass = 7,
    ModifierPass = 8,
    ControlFlowPass = 9,
    ReturnTypePass = 10,
    PrepConversionPass = 11,
    MergePass = 12,
    CompletionPass = 13,
    ReflectionPass = 14,
}

impl Pass {
    pub const ALL: [Pass; 15] = [
        Pass::ResolveImport,
        Pass::ResolveModuleMembers,
        Pass::BaseTypesPass,
        Pass::FieldPass,
        Pass::RecursiveFieldTypePass,
        Pass::OverloadingPass,
        Pass::AttributePass,
        Pass::ParameterTypePass,
        Pass::ModifierPass,
        Pass::ControlFlowPass,
        Pass::ReturnTypePass,
        Pass::PrepConversionPass,
        Pass::MergePass,
        Pass::CompletionPass,
        Pass::ReflectionPass,
    ];

    fn bit(self) -> PassSet {
        PassSet::from_bits_truncate(1 << (self as u16))
    }
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct PassSet: u16 {
        const RESOLVE_IMPORT            = 1 << 0;
        const RESOLVE_MODULE_MEMBERS    = 1 << 1;
        const BASE_TYPES_PASS           = 1 << 2;
        const FIELD_PASS                = 1 << 3;
        const RECURSIVE_FIELD_TYPE_PASS = 1 << 4;
        const OVERLOADING_PASS          = 1 << 5;
        const ATTRIBUTE_PASS            = 1 << 6;
        const PARAMETER_TYPE_PASS       = 1 << 7;
        const MODIFIER_PASS             = 1 << 8;
        const CONTROL_FLOW_PASS         = 1 << 9;
        const RETURN_TYPE_PASS          = 1 << 10;
        const PREP_CONVERSION_PASS      = 1 << 11;
        const MERGE_PASS                = 1 << 12;
        const COMPLETION_PASS           = 1 << 13;
        const REFLECTION_PASS           = 1 << 14;
    }
}

/// Outcome of [`DefnPasses::begin`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BeginOutcome {
    /// Pass already finished; caller can use its results immediately.
    Done,
    /// Pass is already running on this defn — a cycle. The caller must
    /// recover (forward-declare) or diagnose.
    Cycle,
    /// Pass was not running or finished; it is now marked running and the
    /// caller should perform the work.
    Proceed,
}

/// The two sub-bitsets a defn carries: which passes are currently running
/// (on the call stack) and which have finished.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct DefnPasses {
    running: PassSet,
    finished: PassSet,
}

impl DefnPasses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_finished(&self, pass: Pass) -> bool {
        self.finished.contains(pass.bit())
    }

    #[must_use]
    pub fn is_running(&self, pass: Pass) -> bool {
        self.running.contains(pass.bit())
    }

    /// The `beginPass` primitive from §4.2.
    pub fn begin(&mut self, pass: Pass) -> BeginOutcome {
        if self.finished.contains(pass.bit()) {
            return BeginOutcome::Done;
        }
        if self.running.contains(pass.bit()) {
            return BeginOutcome::Cycle;
        }
        self.running.insert(pass.bit());
        BeginOutcome::Proceed
    }

    /// The `finishPass` primitive from §4.2. Finishing is monotonic:
    /// finished passes are observable by every later pass forever.
    pub fn finish(&mut self, pass: Pass) {
        self.running.remove(pass.bit());
        self.finished.insert(pass.bit());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_then_begin_again_is_cycle() {
        let mut passes = DefnPasses::new();
        assert_eq!(passes.begin(Pass::FieldPass), BeginOutcome::Proceed);
        assert_eq!(passes.begin(Pass::FieldPass), BeginOutcome::Cycle);
    }

    #[test]
    fn finish_then_begin_is_done() {
        let mut passes = DefnPasses::new();
        passes.begin(Pass::FieldPass);
        passes.finish(Pass::FieldPass);
        assert_eq!(passes.begin(Pass::FieldPass), BeginOutcome::Done);
    }

    #[test]
    fn finished_passes_stay_finished() {
        let mut passes = DefnPasses::new();
        passes.begin(Pass::BaseTypesPass);
        passes.finish(Pass::BaseTypesPass);
        assert!(passes.is_finished(Pass::BaseTypesPass));
        assert!(!passes.is_running(Pass::BaseTypesPass));
    }

    #[test]
    fn independent_passes_do_not_interfere() {
        let mut passes = DefnPasses::new();
        passes.begin(Pass::FieldPass);
        assert_eq!(passes.begin(Pass::OverloadingPass), BeginOutcome::Proceed);
    }
}
