//! Conf module: configuration model, error type and loading.

pub mod model;
pub mod load;
pub mod error;

pub use model::{AnalyzerConfig, DEFAULT_SAMPLE_LIMIT, DEFAULT_TOP_N};
pub use error::ConfigError;
