//! Capture pipeline: routes bodies by content type, assembles the sanitized payload and
//! publishes it, with the derived attributes, to the host's span.

pub mod assemble;
pub mod content;
pub mod exchange;
pub mod extract;
pub mod filter;
pub mod settings;
pub mod sink;
pub mod tracking;

pub use assemble::{build_body, parse_query_string};
pub use content::{classify, BodyKind};
pub use exchange::{CapturedRequest, CapturedResponse, RawBody};
pub use extract::Extractor;
pub use filter::CaptureFilter;
pub use settings::CaptureSettings;
pub use sink::{RecordingSink, SpanSink};
