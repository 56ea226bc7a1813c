//! Template argument deduction (§4.3 "Template specialization"):
//! unification against call-site argument types or explicit type
//! arguments, and the per-template instance cache that guarantees one
//! instance per unique binding.

mod binding_env;
mod instance_cache;
mod unify;

use thorn_ir::DefnId;
use thorn_types::{CompositeKind, CompositeLookup, Idx, Pool};

pub use binding_env::BindingEnv;
pub use instance_cache::InstanceCache;
pub use unify::{unify, UnifyError};

/// A `CompositeLookup` with no hierarchy, used when unification needs a
/// lookup but has no module at hand and isn't unifying composite
/// subtyping relations (the common case: template parameters over
/// primitives, tuples, and function types).
pub struct EmptyCompositeLookup;

impl CompositeLookup for EmptyCompositeLookup {
    fn super_of(&self, _defn: DefnId) -> Option<DefnId> {
        None
    }

    fn interfaces_of(&self, _defn: DefnId) -> &[DefnId] {
        &[]
    }

    fn composite_kind(&self, _defn: DefnId) -> CompositeKind {
        CompositeKind::Class
    }
}

/// Deduces bindings for every parameter in `params` given the
/// corresponding call-site argument types in `args`, per the "Given a
/// call site with value arguments" deduction rule. Returns the completed
/// environment, or the first unification failure encountered.
pub fn deduce_from_call(pool: &Pool, params: &[Idx], args: &[Idx]) -> Result<BindingEnv, UnifyError> {
    let mut env = BindingEnv::new();
    for (param, arg) in params.iter().zip(args.iter()) {
        unify(pool, *param, *arg, &mut env)?;
    }
    Ok(env)
}

/// Deduces bindings from an explicit, positionally-ordered type argument
/// list (the "given explicit arguments, unify them positionally" rule).
pub fn deduce_from_explicit_args(template_vars: &[Idx], explicit_args: &[Idx]) -> BindingEnv {
    let mut env = BindingEnv::new();
    for (var, arg) in template_vars.iter().zip(explicit_args.iter()) {
        env.bind(*var, *arg);
    }
    env
}

/// Whether a binding is a *partial instantiation*: some bound type is
/// itself an unbound type variable belonging to an enclosing template.
/// Partial instantiations are marked `PartialInstantiation` and excluded
/// from code generation.
#[must_use]
pub fn is_partial_instantiation(pool: &Pool, bound_args: &[Idx]) -> bool {
    bound_args.iter().any(|arg| !pool.is_singular(*arg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use thorn_ir::NameInterner;
    use thorn_types::{PrimitiveKind, TypeVarConstraint, TypeVarData};

    #[test]
    fn deduce_from_call_binds_each_parameter() {
        let mut pool = Pool::new();
        let interner = NameInterner::new();
        let t = pool.new_type_variable(TypeVarData { name: interner.intern("T"), constraint: TypeVarConstraint::IsInstance, bound: None });
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        let env = deduce_from_call(&pool, &[t], &[i32_ty]).unwrap();
        assert_eq!(env.get(t), Some(i32_ty));
    }

    #[test]
    fn instantiation_with_unbound_variable_is_partial() {
        let mut pool = Pool::new();
        let interner = NameInterner::new();
        let outer_var =
            pool.new_type_variable(TypeVarData { name: interner.intern("U"), constraint: TypeVarConstraint::IsInstance, bound: None });
        assert!(is_partial_instantiation(&pool, &[outer_var]));
    }

    #[test]
    fn instantiation_with_concrete_types_is_not_partial() {
        let pool = Pool::new();
        let i32_ty = pool.primitive(PrimitiveKind::I32);
        assert!(!is_partial_instantiation(&pool, &[i32_ty]));
    }
}
