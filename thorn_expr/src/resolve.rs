//! Name resolution and implicit-self insertion (§4.3).

use thorn_defn::{Defn, DefnKind};
use thorn_ir::DefnId;

/// The outcome of `lookupName`: every visible binding for a plain symbol
/// reference. Overloaded function names return more than one entry;
/// resolving *which* one binds a call site is overload resolution's job,
/// not name resolution's.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExprList {
    pub defns: Vec<DefnId>,
}

impl ExprList {
    #[must_use]
    pub fn single(defn: DefnId) -> Self {
        ExprList { defns: vec![defn] }
    }
}

#[derive(Debug)]
pub enum NameResolutionError {
    /// A plain reference resolved to more than one non-function defn.
    AmbiguousName,
    /// A plain reference resolved to a mix of type defns and function
    /// defns — neither a value access nor a call.
    StructuralCoercion,
    Undefined,
}

/// Classifies a `lookupName` result the way a plain (non-call) symbol
/// reference must: exactly one binding unless every binding is a
/// function (in which case overload resolution at the call site decides
/// among them).
pub fn classify_lookup(list: &ExprList, get: impl Fn(DefnId) -> bool) -> Result<LookupShape, NameResolutionError> {
    if list.defns.is_empty() {
        return Err(NameResolutionError::Undefined);
    }
    if list.defns.len() == 1 {
        return Ok(LookupShape::Single(list.defns[0]));
    }
    let all_functions = list.defns.iter().all(|d| get(*d));
    let any_function = list.defns.iter().any(|d| get(*d));
    if all_functions {
        Ok(LookupShape::Overloaded(list.defns.clone()))
    } else if any_function {
        Err(NameResolutionError::StructuralCoercion)
    } else {
        Err(NameResolutionError::AmbiguousName)
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum LookupShape {
    Single(DefnId),
    Overloaded(Vec<DefnId>),
}

/// Implements "implicit self": when an instance member is named without
/// a base expression inside a non-static method, the current function's
/// self parameter is inserted as the base. Returns `None` if there is no
/// enclosing self (the caller then emits `E_InstanceMemberFromStatic`).
#[must_use]
pub fn implicit_self(enclosing_function: Option<&Defn>) -> Option<DefnId> {
    let defn = enclosing_function?;
    let DefnKind::Function(function) = &defn.kind else {
        return None;
    };
    function.self_param
}
