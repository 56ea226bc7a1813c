//! A composite's per-overload-group method table: append-only until
//! `OverloadingPass` completes, then frozen (§5 "Shared mutable state").

use rustc_hash::FxHashMap;
use thorn_ir::{DefnId, Name};

#[derive(Debug)]
pub struct AlreadyFrozen;

#[derive(Default)]
pub struct MethodTable {
    groups: FxHashMap<Name, Vec<DefnId>>,
    frozen: bool,
}

impl MethodTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Name, method: DefnId) -> Result<(), AlreadyFrozen> {
        if self.frozen {
            return Err(AlreadyFrozen);
        }
        self.groups.entry(name).or_default().push(method);
        Ok(())
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[must_use]
    pub fn overloads(&self, name: Name) -> &[DefnId] {
        self.groups.get(&name).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_after_freeze_fails() {
        let mut table = MethodTable::new();
        table.freeze();
        assert!(table.insert(Name::EMPTY, DefnId(1)).is_err());
    }

    #[test]
    fn overloads_accumulate_under_one_name() {
        let mut table = MethodTable::new();
        table.insert(Name::EMPTY, DefnId(1)).unwrap();
        table.insert(Name::EMPTY, DefnId(2)).unwrap();
        assert_eq!(table.overloads(Name::EMPTY), &[DefnId(1), DefnId(2)]);
    }
}
