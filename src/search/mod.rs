pub mod evaluator;
pub mod results;

pub use evaluator::{QueryEvaluator, SearchHit, SearchOutcome};
pub use results::format_response;
