//! Scoring submitted predictions against a fixed ground truth.

mod evaluator;
mod upload;

pub use evaluator::{Config, Evaluator, MetricsReport};
pub use upload::{allowed_file, secure_filename};
