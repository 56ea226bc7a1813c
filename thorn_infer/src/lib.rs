//! Bidirectional type inference (§4.4): constraint generation over
//! typing variables left unsized by the expression analyzer, iterative
//! resolution against an optional expected type, and the finalize pass
//! that substitutes resolved types back into the typed tree.

mod constraint;
mod engine;
mod finalize;

pub use constraint::{Candidates, TypingVar};
pub use engine::{InferError, InferenceEngine, Resolution};
pub use finalize::{substitute, verify_singular, NonSingular};
