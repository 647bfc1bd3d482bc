// Pipeline-stage module structure for the log analyzer.

// Line handling
pub mod parser;
pub mod normalize;
pub mod logs;

// Aggregation and findings
pub mod aggregate;
pub mod anomaly;

// Run lifecycle
pub mod conf;
pub mod runtime;
