//! The finalize pass (§4.4, last paragraph): substitutes every resolved
//! typing variable's type into its expression node and checks that the
//! whole body is left singular.

use rustc_hash::FxHashMap;
use thiserror::Error;
use thorn_expr::{ExprArena, ExprId};
use thorn_types::Pool;

use crate::constraint::TypingVar;
use crate::engine::Resolution;

#[derive(Error, Debug, Eq, PartialEq)]
#[error("expression {0:?} is still non-singular after finalization")]
pub struct NonSingular(pub ExprId);

/// Writes each resolved typing variable's type back into the node it
/// denotes. `var_to_expr` is the caller's own mapping from the typing
/// variables it minted during constraint generation back to the arena
/// node whose `ty` field they stand in for.
pub fn substitute(arena: &mut ExprArena, resolution: &Resolution, var_to_expr: &FxHashMap<TypingVar, ExprId>) {
    for (&var, &expr_id) in var_to_expr {
        if let Some(resolved) = resolution.get(var) {
            arena.get_mut(expr_id).ty.ty = resolved;
        }
    }
}

/// Walks every node in the arena and confirms none of them still carry a
/// non-singular type (an unbound type variable, or the transient
/// `UnsizedInt` primitive). Returns the first offender found; finalize is
/// expected to run once a whole function body has been substituted, not
/// incrementally, so "first" is enough to drive a diagnostic.
pub fn verify_singular(pool: &Pool, arena: &ExprArena) -> Result<(), NonSingular> {
    for id in arena.ids() {
        if !pool.is_singular(arena.get(id).ty.ty) {
            return Err(NonSingular(id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::InferenceEngine;
    use thorn_ir::Span;
    use thorn_template::EmptyCompositeLookup;
    use thorn_types::{PrimitiveKind, QualifiedType, TypeVarConstraint, TypeVarData};

    #[test]
    fn substitution_replaces_the_placeholder_type() {
        let mut pool = Pool::new();
        let interner = thorn_ir::NameInterner::new();
        let unsized_var = pool.new_type_variable(TypeVarData { name: interner.intern("T"), constraint: TypeVarConstraint::IsInstance, bound: None });
        let i32_ty = pool.primitive(PrimitiveKind::I32);

        let mut arena = ExprArena::new();
        let node = arena.alloc(thorn_expr::Expr { kind: thorn_expr::ExprKind::ConstInt(1), ty: QualifiedType::unqualified(unsized_var), span: Span::DUMMY });

        let mut engine = InferenceEngine::new();
        engine.record_candidates(TypingVar(0), vec![i32_ty]);
        let resolution = engine.resolve(&pool, &EmptyCompositeLookup).unwrap();

        let mut mapping = FxHashMap::default();
        mapping.insert(TypingVar(0), node);
        substitute(&mut arena, &resolution, &mapping);

        assert_eq!(arena.get(node).ty.ty, i32_ty);
        assert!(verify_singular(&pool, &arena).is_ok());
    }

    #[test]
    fn an_unresolved_variable_left_in_place_fails_verification() {
        let mut pool = Pool::new();
        let interner = thorn_ir::NameInterner::new();
        let unbound = pool.new_type_variable(TypeVarData { name: interner.intern("U"), constraint: TypeVarConstraint::IsInstance, bound: None });
        let mut arena = ExprArena::new();
        let node = arena.alloc(thorn_expr::Expr { kind: thorn_expr::ExprKind::NoOp, ty: QualifiedType::unqualified(unbound), span: Span::DUMMY });
        assert_eq!(verify_singular(&pool, &arena), Err(NonSingular(node)));
    }
}
