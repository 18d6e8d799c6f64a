//! Privacy layer of the payload capture engine.
//!
//! Everything here is a pure function over already-buffered input: header maps,
//! JSON text and form bodies go in, scrubbed copies and attribute maps come out.

pub mod errors;
pub mod form;
pub mod headers;
pub mod jsonpath;
pub mod redact;

pub use errors::{PrivacyError, PrivacyResult};
pub use form::{process_multipart, process_urlencoded, FormOutcome};
pub use headers::{
    cookie_pairs, cookie_value, header_value, sanitize_headers, session_from_cookie, HeaderRules,
    SanitizedHeaders,
};
pub use jsonpath::{JsonPath, Resolved};
pub use redact::{process_json, FieldRules, JsonOutcome};
