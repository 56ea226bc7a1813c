//! Structural unification of a template-parameter-bearing type against a
//! concrete argument type, accumulating bindings in a [`BindingEnv`].

use thorn_types::{Idx, Pool, TypeKind, TypeVarConstraint};

use crate::binding_env::BindingEnv;

#[derive(Debug)]
pub enum UnifyError {
    /// The pattern and argument have incompatible shapes (e.g. a tuple
    /// of different arity, or a primitive against a composite).
    ShapeMismatch { pattern: Idx, argument: Idx },
    /// A type variable was unified twice with inconsistent results and
    /// its constraint kind doesn't allow widening/narrowing to reconcile
    /// them.
    Inconsistent { var: Idx, first: Idx, second: Idx },
}

/// Unifies `pattern` (a type possibly containing template type
/// variables) against `argument` (a concrete type from a call site or
/// explicit template argument), writing discovered bindings into `env`.
pub fn unify(pool: &Pool, pattern: Idx, argument: Idx, env: &mut BindingEnv) -> Result<(), UnifyError> {
    let pattern = pool.dealias(pattern);
    let argument = pool.dealias(argument);

    if let TypeKind::TypeVariable(data) = pool.kind(pattern) {
        return unify_var(pool, pattern, data.constraint, argument, env);
    }

    match (pool.kind(pattern), pool.kind(argument)) {
        (TypeKind::Primitive(a), TypeKind::Primitive(b)) if a == b => Ok(()),
        (TypeKind::Composite { defn: a, .. }, TypeKind::Composite { defn: b, .. }) if a == b => Ok(()),
        (TypeKind::Enum { defn: a, .. }, TypeKind::Enum { defn: b, .. }) if a == b => Ok(()),
        (TypeKind::Tuple(pattern_elems), TypeKind::Tuple(arg_elems)) if pattern_elems.len() == arg_elems.len() => {
            for (p, a) in pattern_elems.iter().zip(arg_elems.iter()) {
                unify(pool, *p, *a, env)?;
            }
            Ok(())
        }
        (TypeKind::NativeArray { element: p, length: pl }, TypeKind::NativeArray { element: a, length: al }) if pl == al => {
            unify(pool, *p, *a, env)
        }
        (TypeKind::Address(p), TypeKind::Address(a)) | (TypeKind::FlexibleArray(p), TypeKind::FlexibleArray(a)) => unify(pool, *p, *a, env),
        (TypeKind::Function(p), TypeKind::Function(a)) if p.params.len() == a.params.len() => {
            for (pp, ap) in p.params.iter().zip(a.params.iter()) {
                unify(pool, pp.ty, ap.ty, env)?;
            }
            unify(pool, p.return_type, a.return_type, env)
        }
        _ => Err(UnifyError::ShapeMismatch { pattern, argument }),
    }
}

fn unify_var(pool: &Pool, var: Idx, constraint: TypeVarConstraint, argument: Idx, env: &mut BindingEnv) -> Result<(), UnifyError> {
    let Some(existing) = env.get(var) else {
        env.bind(var, argument);
        return Ok(());
    };
    if existing == argument {
        return Ok(());
    }
    match constraint {
        // A subtype-constrained variable may widen to cover both
        // occurrences; prefer whichever of the two is assignable from
        // the other (the more general of the pair).
        TypeVarConstraint::IsSubtype | TypeVarConstraint::IsSupertype => {
            let lookup = crate::EmptyCompositeLookup;
            if thorn_types::is_assignable(pool, &lookup, existing, argument).is_viable() {
                env.bind(var, argument);
                Ok(())
            } else if thorn_types::is_assignable(pool, &lookup, argument, existing).is_viable() {
                Ok(())
            } else {
                Err(UnifyError::Inconsistent { var, first: existing, second: argument })
            }
        }
        _ => Err(UnifyError::Inconsistent { var, first: existing, second: argument }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thorn_ir::NameInterner;
    use thorn_types::{PrimitiveKind, TypeVarData};

    fn fresh_var(pool: &mut Pool, constraint: TypeVarConstraint) -> Idx {
        let interner = NameInterner::new();
        let name = interner.intern("T");
        pool.new_type_variable(TypeVarData { name, constraint, bound: None })
    }

    #[test]
    fn identical_primitives_unify_trivially() {
        let pool = Pool::new();
        let mut env = BindingEnv::new();
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        assert!(unify(&pool, i32_ty, i32_ty, &mut env).is_ok());
    }

    #[test]
    fn type_variable_binds_on_first_occurrence() {
        let mut pool = Pool::new();
        let var = fresh_var(&mut pool, TypeVarConstraint::IsInstance);
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let mut env = BindingEnv::new();
        unify(&pool, var, i32_ty, &mut env).unwrap();
        assert_eq!(env.get(var), Some(i32_ty));
    }

    #[test]
    fn repeated_occurrence_with_same_type_is_consistent() {
        let mut pool = Pool::new();
        let var = fresh_var(&mut pool, TypeVarConstraint::IsInstance);
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let tuple = pool.intern_tuple(vec![var, var]);
        let arg_tuple = pool.intern_tuple(vec![i32_ty, i32_ty]);
        let mut env = BindingEnv::new();
        assert!(unify(&pool, tuple, arg_tuple, &mut env).is_ok());
    }

    #[test]
    fn repeated_occurrence_with_conflicting_type_fails_for_instance_constraint() {
        let mut pool = Pool::new();
        let var = fresh_var(&mut pool, TypeVarConstraint::IsInstance);
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let bool_ty = pool.primitive(PrimitiveKind::Bool);
        let tuple = pool.intern_tuple(vec![var, var]);
        let arg_tuple = pool.intern_tuple(vec![i32_ty, bool_ty]);
        let mut env = BindingEnv::new();
        assert!(unify(&pool, tuple, arg_tuple, &mut env).is_err());
    }

    #[test]
    fn mismatched_tuple_arity_is_a_shape_mismatch() {
        let mut pool = Pool::new();
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let pattern = pool.intern_tuple(vec![i32_ty]);
        let argument = pool.intern_tuple(vec![i32_ty, i32_ty]);
        let mut env = BindingEnv::new();
        assert!(matches!(unify(&pool, pattern, argument, &mut env), Err(UnifyError::ShapeMismatch { .. })));
    }
}
