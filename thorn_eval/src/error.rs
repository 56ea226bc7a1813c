//! Evaluation failure modes (§7's Constant-eval taxonomy).

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("expression is not a constant")]
    NotAConstant,
    #[error("read of an uninitialized variable")]
    UninitializedVariable,
    #[error("field {0:?} was never assigned")]
    MissingField(thorn_ir::DefnId),
    #[error("expression depends on a runtime-only value")]
    RuntimeOnly,
    #[error("function {0:?} has no evaluable body")]
    NoEvaluableBody(thorn_ir::DefnId),
    #[error("call graph includes an unsupported intrinsic")]
    UnsupportedIntrinsic,
    #[error("evaluator feature not yet implemented: {0}")]
    Unimplemented(&'static str),
}

pub type EvalResult = Result<crate::value::Value, EvalError>;
