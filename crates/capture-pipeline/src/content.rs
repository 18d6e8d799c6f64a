//! Content router: picks a body strategy from the declared content type.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Text,
    Html,
    Xml,
    FormUrlEncoded,
    FormData,
    /// Missing or unrecognised content type. Captured as raw text.
    Unknown,
}

/// Substring match on the lower-cased content type, in fixed priority order.
pub fn classify(content_type: Option<&str>) -> BodyKind {
    let Some(content_type) = content_type else {
        return BodyKind::Unknown;
    };
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("application/json") {
        BodyKind::Json
    } else if content_type.contains("text/plain") {
        BodyKind::Text
    } else if content_type.contains("text/html") {
        BodyKind::Html
    } else if content_type.contains("text/xml") || content_type.contains("application/xml") {
        BodyKind::Xml
    } else if content_type.contains("application/x-www-form-urlencoded") {
        BodyKind::FormUrlEncoded
    } else if content_type.contains("multipart/form-data") {
        BodyKind::FormData
    } else {
        BodyKind::Unknown
    }
}
