//! The process-wide (per-`CompilationContext`) canonical type cache.
//!
//! Tuple, Union, Function, `NativeArray`, Address, and `FlexibleArray`
//! values are structurally interned: two constructions with equal content
//! yield the same [`Idx`]. Composite and Enum types are identified by
//! their owning defn rather than structure. Primitives are pre-interned at
//! fixed indices so `Pool::new` callers get stable, well-known handles.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use thorn_ir::DefnId;

use crate::ty::{FunctionTypeData, PrimitiveKind, TypeKind, TypeVarData};

/// The unified type pool.
pub struct Pool {
    items: Vec<TypeKind>,
    intern_map: FxHashMap<u64, Vec<Idx>>,
    composite_index: FxHashMap<DefnId, Idx>,
    enum_index: FxHashMap<DefnId, Idx>,
    primitives: [Idx; PRIMITIVE_COUNT],
}

use crate::ty::Idx;

const PRIMITIVE_COUNT: usize = 15;

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    #[must_use]
    pub fn new() -> Self {
        let mut pool = Pool {
            items: Vec::new(),
            intern_map: FxHashMap::default(),
            composite_index: FxHashMap::default(),
            enum_index: FxHashMap::default(),
            primitives: [Idx(0); PRIMITIVE_COUNT],
        };
        let order = [
            PrimitiveKind::Void,
            PrimitiveKind::Null,
            PrimitiveKind::Bool,
            PrimitiveKind::Char,
            PrimitiveKind::I8,
            PrimitiveKind::I16,
            PrimitiveKind::I32,
            PrimitiveKind::I64,
            PrimitiveKind::U8,
            PrimitiveKind::U16,
            PrimitiveKind::U32,
            PrimitiveKind::U64,
            PrimitiveKind::Float,
            PrimitiveKind::Double,
            PrimitiveKind::UnsizedInt,
        ];
        for (slot, kind) in order.into_iter().enumerate() {
            let idx = pool.push_unconditionally(TypeKind::Primitive(kind));
            pool.primitives[slot] = idx;
        }
        pool
    }

    #[must_use]
    pub fn primitive(&self, kind: PrimitiveKind) -> Idx {
        self.primitives[kind as usize]
    }

    #[must_use]
    pub fn kind(&self, idx: Idx) -> &TypeKind {
        &self.items[idx.0 as usize]
    }

    fn push_unconditionally(&mut self, kind: TypeKind) -> Idx {
        let idx = Idx(self.items.len() as u32);
        self.items.push(kind);
        idx
    }

    fn hash_of(kind: &TypeKind) -> u64 {
        let mut hasher = FxHasher::default();
        kind.hash(&mut hasher);
        hasher.finish()
    }

    /// Interns a structural type kind, returning the existing `Idx` if an
    /// equal one was already constructed.
    fn intern_structural(&mut self, kind: TypeKind) -> Idx {
        let hash = Self::hash_of(&kind);
        if let Some(candidates) = self.intern_map.get(&hash) {
            for &candidate in candidates {
                if self.items[candidate.0 as usize] == kind {
                    return candidate;
                }
            }
        }
        let idx = self.push_unconditionally(kind);
        self.intern_map.entry(hash).or_default().push(idx);
        idx
    }

    pub fn intern_tuple(&mut self, elements: Vec<Idx>) -> Idx {
        self.intern_structural(TypeKind::Tuple(elements))
    }

    /// Interns a union from an already-canonicalized member list (see
    /// `ty::canonicalize_union`).
    pub fn intern_union(&mut self, members: Vec<Idx>, has_ref_types_only: bool) -> Idx {
        self.intern_structural(TypeKind::Union { members, has_ref_types_only })
    }

    pub fn intern_function(&mut self, data: FunctionTypeData) -> Idx {
        self.intern_structural(TypeKind::Function(data))
    }

    pub fn intern_native_array(&mut self, element: Idx, length: u64) -> Idx {
        self.intern_structural(TypeKind::NativeArray { element, length })
    }

    pub fn intern_address(&mut self, pointee: Idx) -> Idx {
        self.intern_structural(TypeKind::Address(pointee))
    }

    pub fn intern_flexible_array(&mut self, element: Idx) -> Idx {
        self.intern_structural(TypeKind::FlexibleArray(element))
    }

    pub fn intern_type_alias(&mut self, target: Idx) -> Idx {
        self.intern_structural(TypeKind::TypeAlias(target))
    }

    /// Introduces a fresh, distinct type variable (never deduplicated:
    /// each template parameter/inference placeholder is its own object
    /// even if structurally identical to another).
    pub fn new_type_variable(&mut self, data: TypeVarData) -> Idx {
        self.push_unconditionally(TypeKind::TypeVariable(data))
    }

    /// Looks up or creates the `Composite` type for `defn`. Composite
    /// identity is nominal (keyed on `defn`), not structural.
    pub fn composite_for(&mut self, defn: DefnId, kind: crate::ty::CompositeKind) -> Idx {
        if let Some(idx) = self.composite_index.get(&defn) {
            return *idx;
        }
        let idx = self.push_unconditionally(TypeKind::Composite { defn, kind });
        self.composite_index.insert(defn, idx);
        idx
    }

    pub fn enum_for(&mut self, defn: DefnId, base: Idx) -> Idx {
        if let Some(idx) = self.enum_index.get(&defn) {
            return *idx;
        }
        let idx = self.push_unconditionally(TypeKind::Enum { defn, base });
        self.enum_index.insert(defn, idx);
        idx
    }

    /// Strips away `TypeAlias` forwarders, following the chain to the
    /// first non-alias type.
    #[must_use]
    pub fn dealias(&self, mut idx: Idx) -> Idx {
        while let TypeKind::TypeAlias(target) = self.kind(idx) {
            idx = *target;
        }
        idx
    }

    /// A type is singular iff it contains no unbound type variables and no
    /// transient `UnsizedInt` placeholder, transitively.
    #[must_use]
    pub fn is_singular(&self, idx: Idx) -> bool {
        let idx = self.dealias(idx);
        match self.kind(idx) {
            TypeKind::TypeVariable(_) => false,
            TypeKind::Primitive(kind) => *kind != PrimitiveKind::UnsizedInt,
            TypeKind::Composite { .. } | TypeKind::Enum { .. } => true,
            TypeKind::Tuple(elements) => elements.iter().all(|e| self.is_singular(*e)),
            TypeKind::Union { members, .. } => members.iter().all(|m| self.is_singular(*m)),
            TypeKind::NativeArray { element, .. } | TypeKind::Address(element) | TypeKind::FlexibleArray(element) => {
                self.is_singular(*element)
            }
            TypeKind::Function(data) => {
                data.params.iter().all(|p| self.is_singular(p.ty)) && self.is_singular(data.return_type)
            }
            TypeKind::TypeAlias(_) => unreachable!("dealias already stripped aliases"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::CompositeKind;

    #[test]
    fn equal_tuples_intern_to_same_idx() {
        let mut pool = Pool::new();
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let bool_ty = pool.primitive(PrimitiveKind::Bool);
        let a = pool.intern_tuple(vec![i32_ty, bool_ty]);
        let b = pool.intern_tuple(vec![i32_ty, bool_ty]);
        assert_eq!(a, b);
    }

    #[test]
    fn different_tuples_intern_differently() {
        let mut pool = Pool::new();
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let bool_ty = pool.primitive(PrimitiveKind::Bool);
        let a = pool.intern_tuple(vec![i32_ty, bool_ty]);
        let b = pool.intern_tuple(vec![bool_ty, i32_ty]);
        assert_ne!(a, b);
    }

    #[test]
    fn composite_identity_is_nominal() {
        let mut pool = Pool::new();
        let defn = DefnId(42);
        let a = pool.composite_for(defn, CompositeKind::Class);
        let b = pool.composite_for(defn, CompositeKind::Class);
        assert_eq!(a, b);
    }

    #[test]
    fn type_variables_are_never_deduplicated() {
        let mut pool = Pool::new();
        let name = thorn_ir::NameInterner::new().intern("T");
        let data = TypeVarData { name, constraint: crate::ty::TypeVarConstraint::IsInstance, bound: None };
        let a = pool.new_type_variable(data.clone());
        let b = pool.new_type_variable(data);
        assert_ne!(a, b);
    }

    #[test]
    fn dealias_follows_chain() {
        let mut pool = Pool::new();
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let alias1 = pool.intern_type_alias(i32_ty);
        let alias2 = pool.intern_type_alias(alias1);
        assert_eq!(pool.dealias(alias2), i32_ty);
    }

    #[test]
    fn singular_detects_unbound_variables_transitively() {
        let mut pool = Pool::new();
        let name = thorn_ir::NameInterner::new().intern("T");
        let var = pool.new_type_variable(TypeVarData { name, constraint: crate::ty::TypeVarConstraint::IsInstance, bound: None });
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let tuple_with_var = pool.intern_tuple(vec![i32_ty, var]);
        let tuple_singular = pool.intern_tuple(vec![i32_ty, i32_ty]);
        assert!(!pool.is_singular(tuple_with_var));
        assert!(pool.is_singular(tuple_singular));
    }

    #[test]
    fn unsized_int_is_not_singular() {
        let pool = Pool::new();
        let unsized_ty = pool.primitive(PrimitiveKind::UnsizedInt);
        assert!(!pool.is_singular(unsized_ty));
    }
}
