//! Runtime module: run lifecycle, boot then analyze.

pub mod boot;
pub mod run;

pub use boot::{boot, init_logging, Analysis};
pub use run::{analyze, analyze_file, analyze_lines, InputDiagnostic, InputError, RunOutcome};
