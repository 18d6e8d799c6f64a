//! Shared primitives for the payload capture engine.
//!
//! Every layer (rules, privacy, pipeline) exchanges data through these types: the
//! sanitized [`Payload`] record, the flat [`Attributes`] map and the per-call
//! [`ExtractResult`].

pub mod attributes;
pub mod errors;
pub mod payload;

pub use attributes::Attributes;
pub use errors::{CaptureError, CaptureResult};
pub use payload::{
    BinaryBody, Body, Direction, ExtractResult, HeaderMap, HttpPayload, KeyValueBody, Payload,
};
