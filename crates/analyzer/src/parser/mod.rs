/// Line parsing: format detection and raw field extraction
///
/// # Architecture
///
/// - `model.rs`: Formats, severities, raw fields and the canonical record
/// - `traits.rs`: The `FieldExtractor` seam every grammar implements
/// - `grammar.rs`: Compiled grammar table plus auxiliary patterns
/// - `detector.rs`: Priority-ordered detection with optional format hint
/// - `formats/`: One grammar per supported convention
/// - `timestamp.rs`: Ordered timestamp layouts per format family
///
/// Unmatched lines are data, not errors: they come back as UNKNOWN.

pub mod traits;
pub mod model;
pub mod grammar;
pub mod detector;
pub mod formats;
pub mod timestamp;

// Re-export commonly used types
pub use traits::FieldExtractor;
pub use model::{
    CanonicalRecord, FormatHint, GrammarError, LineOrigin, LogFormat, ParseError, RawFields,
    Severity,
};
pub use grammar::{GrammarTable, DETECTION_ORDER};
pub use detector::{FormatDetector, ParsedLine};

/// Display bound for lines no grammar matched.
pub const UNMATCHED_MESSAGE_LIMIT: usize = 200;
