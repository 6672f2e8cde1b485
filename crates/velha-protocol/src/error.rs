//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding a record.
///
/// Decode failures are never fatal to a match: the match answers them
/// with an ordinary status message. The inner strings are for logs only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The text is not well-formed markup (unclosed tags, stray
    /// characters, content after the root element).
    #[error("malformed document: {0}")]
    Malformed(String),

    /// The document is well-formed but does not describe a record:
    /// missing, duplicated or unknown elements, or a value that is not
    /// one of the allowed tokens.
    #[error("schema violation: {0}")]
    Schema(String),

    /// A record could not be turned into text.
    #[error("encode failed: {0}")]
    Encode(String),
}
