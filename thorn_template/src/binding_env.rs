//! The accumulator unification writes bindings into.

use rustc_hash::FxHashMap;
use thorn_types::Idx;

/// Maps template type variables to the concrete type bound to them so
/// far. Built incrementally by `unify`; read back by instantiation to
/// substitute into the template's member types.
#[derive(Default, Clone, Debug)]
pub struct BindingEnv {
    bindings: FxHashMap<Idx, Idx>,
}

impl BindingEnv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, var: Idx) -> Option<Idx> {
        self.bindings.get(&var).copied()
    }

    pub fn bind(&mut self, var: Idx, ty: Idx) {
        self.bindings.insert(var, ty);
    }

    #[must_use]
    pub fn is_fully_bound(&self, vars: &[Idx]) -> bool {
        vars.iter().all(|v| self.bindings.contains_key(v))
    }

    /// The bound types for `vars`, in order, for use as an instance
    /// cache key. Returns `None` if any variable is still unbound.
    #[must_use]
    pub fn canonical_tuple(&self, vars: &[Idx]) -> Option<Vec<Idx>> {
        vars.iter().map(|v| self.get(*v)).collect()
    }
}
