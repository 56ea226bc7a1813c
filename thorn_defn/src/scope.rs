//! Scopes: ordered symbol tables keyed by short name, where a name may
//! resolve to more than one defn (overloads).

use rustc_hash::FxHashMap;
use thorn_ir::{DefnId, Name};

/// An ordered symbol table. Insertion order is preserved per name so
/// diagnostics (and deterministic overload-candidate ordering) don't
/// depend on hash iteration order.
#[derive(Default)]
pub struct Scope {
    entries: FxHashMap<Name, Vec<DefnId>>,
    insertion_order: Vec<Name>,
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Name, defn: DefnId) {
        if !self.entries.contains_key(&name) {
            self.insertion_order.push(name);
        }
        self.entries.entry(name).or_default().push(defn);
    }

    #[must_use]
    pub fn lookup(&self, name: Name) -> &[DefnId] {
        self.entries.get(&name).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn names(&self) -> &[Name] {
        &self.insertion_order
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insertion_order.is_empty()
    }
}

/// The chain of scopes consulted when resolving a name, from innermost
/// (searched first) to outermost. Block scopes are pushed/popped as the
/// expression analyzer enters/leaves nested statements; composite member
/// scopes and the module scope are stable for the duration of analysis.
pub struct ScopeChain<'a> {
    scopes: Vec<&'a Scope>,
}

impl<'a> ScopeChain<'a> {
    #[must_use]
    pub fn new() -> Self {
        ScopeChain { scopes: Vec::new() }
    }

    #[must_use]
    pub fn pushed(mut self, scope: &'a Scope) -> Self {
        self.scopes.push(scope);
        self
    }

    /// Walks from the innermost scope outward, returning the first
    /// nonempty binding set found.
    #[must_use]
    pub fn lookup(&self, name: Name) -> &[DefnId] {
        for scope in self.scopes.iter().rev() {
            let found = scope.lookup(name);
            if !found.is_empty() {
                return found;
            }
        }
        &[]
    }
}

impl<'a> Default for ScopeChain<'a> {
    fn default() -> Self {
        Self::new()
    }
}
