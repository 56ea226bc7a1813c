//! The typed expression ADT, the tree-transducer analyzer's name
//! resolution and lvalue/property-lowering rules, and overload
//! resolution (§4.3).

mod expr;
mod lvalue;
mod overload;
mod resolve;
mod transduce;
mod typed_body;

pub use expr::{BinaryOpcode, CatchArm, CompareOp, Expr, ExprArena, ExprId, ExprKind, SwitchArm};
pub use lvalue::{enclosing_function_allows_direct_member_access, lower_property, reduce_load_value, reduce_store_value, reduce_value_ref, PropertyLowering};
pub use overload::{ambiguous_call_diagnostic, bind_arguments, rank_candidate, resolve, CallCandidate, OverloadOutcome, RankedCandidate};
pub use resolve::{classify_lookup, implicit_self, ExprList, LookupShape, NameResolutionError};
pub use transduce::{Lowering, LoweredBody};
pub use typed_body::TypedBodies;
