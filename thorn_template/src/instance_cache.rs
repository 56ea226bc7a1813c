//! One cache entry per unique binding of a template's type parameters;
//! guarantees a single instance object per canonical argument tuple.

use rustc_hash::FxHashMap;
use thorn_ir::DefnId;
use thorn_types::Idx;

#[derive(Default)]
pub struct InstanceCache {
    instances: FxHashMap<(DefnId, Vec<Idx>), DefnId>,
}

impl InstanceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lookup(&self, template: DefnId, bound_args: &[Idx]) -> Option<DefnId> {
        self.instances.get(&(template, bound_args.to_vec())).copied()
    }

    /// Records a newly-created instance for `template` under
    /// `bound_args`. Callers must have already checked `lookup` returned
    /// `None` — re-inserting a key overwrites silently, which would hide
    /// a caching bug, so this asserts instead.
    pub fn insert(&mut self, template: DefnId, bound_args: Vec<Idx>, instance: DefnId) {
        let key = (template, bound_args);
        assert!(!self.instances.contains_key(&key), "template instance already cached for this binding");
        self.instances.insert(key, instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_binding_returns_the_same_instance() {
        let mut cache = InstanceCache::new();
        let template = DefnId(1);
        let args = vec![Idx(7)];
        cache.insert(template, args.clone(), DefnId(100));
        assert_eq!(cache.lookup(template, &args), Some(DefnId(100)));
    }

    #[test]
    fn different_bindings_are_independent() {
        let mut cache = InstanceCache::new();
        let template = DefnId(1);
        cache.insert(template, vec![Idx(1)], DefnId(10));
        cache.insert(template, vec![Idx(2)], DefnId(20));
        assert_eq!(cache.lookup(template, &[Idx(1)]), Some(DefnId(10)));
        assert_eq!(cache.lookup(template, &[Idx(2)]), Some(DefnId(20)));
    }

    #[test]
    #[should_panic(expected = "already cached")]
    fn reinserting_the_same_binding_panics() {
        let mut cache = InstanceCache::new();
        cache.insert(DefnId(1), vec![Idx(1)], DefnId(10));
        cache.insert(DefnId(1), vec![Idx(1)], DefnId(11));
    }
}
