//! Compiler-implemented functions dispatched by `IntrinsicId` rather than
//! by evaluating a body (§10.6's "Supplemented features" note on
//! `tart::Intrinsic`).

use rustc_hash::FxHashMap;
use thorn_defn::IntrinsicId;

use crate::error::EvalResult;
use crate::value::Value;

/// An intrinsic's implementation: a plain function over already-evaluated
/// argument values. Boxed trait object rather than a bare `fn` pointer so
/// a registry can also hold intrinsics that close over configuration
/// (none do yet, but `typeOf` will need the type pool once wired in).
pub type IntrinsicFn = Box<dyn Fn(&[Value]) -> EvalResult>;

#[derive(Default)]
pub struct IntrinsicRegistry {
    table: FxHashMap<IntrinsicId, IntrinsicFn>,
}

impl IntrinsicRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: IntrinsicId, f: IntrinsicFn) {
        self.table.insert(id, f);
    }

    pub fn call(&self, id: IntrinsicId, args: &[Value]) -> Option<EvalResult> {
        self.table.get(&id).map(|f| f(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_intrinsic_is_callable_by_id() {
        let mut registry = IntrinsicRegistry::new();
        registry.register(IntrinsicId(0), Box::new(|args| Ok(args[0].clone())));
        let result = registry.call(IntrinsicId(0), &[Value::Bool(true)]);
        assert!(matches!(result, Some(Ok(Value::Bool(true)))));
    }

    #[test]
    fn unregistered_intrinsic_returns_none() {
        let registry = IntrinsicRegistry::new();
        assert!(registry.call(IntrinsicId(0), &[]).is_none());
    }
}
