/// Individual line grammars and their field extractors

pub mod syslog;
pub mod web_access;
pub mod web_error;
pub mod structured_app;

pub use syslog::{SyslogExtractor, SyslogFields};
pub use web_access::{AccessFields, WebAccessExtractor};
pub use web_error::{ErrorFields, WebErrorExtractor};
pub use structured_app::{AppFields, StructuredAppExtractor};
