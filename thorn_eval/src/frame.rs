//! The `CallFrame` stack model (§4.5).

use rustc_hash::FxHashMap;
use thorn_ir::DefnId;

use crate::value::Value;

/// A frame's run state. Any state other than `Running` short-circuits
/// further statement evaluation within that frame — `Seq` checks this
/// after every element, loops check it after every iteration.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RunState {
    Running,
    Return,
    Throw,
    Break,
    Continue,
}

/// One function activation. Locals are keyed by the parameter/local
/// `DefnId` the scope builder assigned them, so a `LValue` reference
/// resolves the same way whether it names a parameter or a block-local.
#[derive(Debug)]
pub struct CallFrame {
    locals: FxHashMap<DefnId, Value>,
    self_value: Option<Value>,
    pub return_value: Option<Value>,
    pub thrown: Option<Value>,
    pub state: RunState,
}

impl CallFrame {
    #[must_use]
    pub fn new(self_value: Option<Value>) -> Self {
        CallFrame { locals: FxHashMap::default(), self_value, return_value: None, thrown: None, state: RunState::Running }
    }

    #[must_use]
    pub fn self_value(&self) -> Option<&Value> {
        self.self_value.as_ref()
    }

    pub fn bind(&mut self, defn: DefnId, value: Value) {
        self.locals.insert(defn, value);
    }

    #[must_use]
    pub fn get(&self, defn: DefnId) -> Option<&Value> {
        self.locals.get(&defn)
    }

    pub fn clear(&mut self, defn: DefnId) {
        self.locals.remove(&defn);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Sets the frame's return value and transitions it out of `Running`.
    pub fn do_return(&mut self, value: Value) {
        self.return_value = Some(value);
        self.state = RunState::Return;
    }

    /// Sets the frame's thrown value and transitions it out of `Running`.
    pub fn do_throw(&mut self, value: Value) {
        self.thrown = Some(value);
        self.state = RunState::Throw;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_frame_is_running_with_no_locals() {
        let frame = CallFrame::new(None);
        assert!(frame.is_running());
        assert!(frame.get(DefnId(0)).is_none());
    }

    #[test]
    fn do_return_sets_value_and_state() {
        let mut frame = CallFrame::new(None);
        frame.do_return(Value::Bool(true));
        assert!(!frame.is_running());
        assert!(matches!(frame.state, RunState::Return));
    }

    #[test]
    fn bind_then_clear_removes_the_local() {
        let mut frame = CallFrame::new(None);
        frame.bind(DefnId(1), Value::Void);
        assert!(frame.get(DefnId(1)).is_some());
        frame.clear(DefnId(1));
        assert!(frame.get(DefnId(1)).is_none());
    }
}
