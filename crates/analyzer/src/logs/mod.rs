//! Logs module: line ingestion with provenance.

pub mod process;
pub mod ingest;

pub use process::LineProcessor;
pub use ingest::{ingest_lines, ingest_reader, Ingest, ReadError, PROGRESS_INTERVAL};
