//! Interned identifiers.
//!
//! Every short name in the program (identifiers, member names, attribute
//! names) is interned once into a [`NameInterner`] and referred to
//! thereafter by the 32-bit [`Name`] handle. This gives O(1) equality and
//! hashing for names flowing through the scope tables and type caches.

use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// An interned identifier. Cheap to copy, compare, and hash.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// Process-wide (or per-`CompilationContext`) string interner.
///
/// Append-only: once a string is interned its `Name` never changes, so
/// `Name`s may be freely cached inside the type pool and definition graph.
pub struct NameInterner {
    strings: RwLock<Inner>,
}

struct Inner {
    table: FxHashMap<Box<str>, Name>,
    entries: Vec<Box<str>>,
}

impl Default for NameInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl NameInterner {
    #[must_use]
    pub fn new() -> Self {
        let interner = NameInterner { strings: RwLock::new(Inner { table: FxHashMap::default(), entries: Vec::new() }) };
        let empty = interner.intern("");
        debug_assert_eq!(empty, Name::EMPTY);
        interner
    }

    /// Intern `s`, returning its stable [`Name`].
    pub fn intern(&self, s: &str) -> Name {
        if let Some(name) = self.strings.read().table.get(s) {
            return *name;
        }
        let mut guard = self.strings.write();
        if let Some(name) = guard.table.get(s) {
            return *name;
        }
        let idx = guard.entries.len() as u32;
        let boxed: Box<str> = s.into();
        guard.entries.push(boxed.clone());
        let name = Name(idx);
        guard.table.insert(boxed, name);
        name
    }

    /// Resolve a previously interned [`Name`] back to its text.
    ///
    /// # Panics
    /// Panics if `name` was not produced by this interner.
    #[must_use]
    pub fn resolve(&self, name: Name) -> String {
        self.strings.read().entries[name.0 as usize].to_string()
    }
}

impl Name {
    /// The interned empty string; always index 0 by construction of
    /// [`NameInterner::new`].
    pub const EMPTY: Name = Name(0);
}
