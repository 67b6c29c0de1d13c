pub mod evaluation_ctx;
pub mod evaluation_flow;

pub use evaluation_ctx::EvaluationRequest;
pub use evaluation_flow::{EvaluationFlow, ORACLE_ERROR_FEEDBACK};
