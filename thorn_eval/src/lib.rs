mod error;
mod eval;
mod frame;
mod intrinsic;
mod value;

pub use error::{EvalError, EvalResult};
pub use eval::Evaluator;
pub use frame::{CallFrame, RunState};
pub use intrinsic::{IntrinsicFn, IntrinsicRegistry};
pub use value::{ConstantObjectRef, ThornInt, Value};
