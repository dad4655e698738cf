//! Error types for the protocol layer.
//!
//! Each crate in Roshambo defines its own error enum. A `ProtocolError`
//! always means the bytes or text on the wire were wrong, never that a
//! connection dropped or a room refused something.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (Rust value → JSON text).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `action`, a
    /// missing field, or a field of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates a protocol rule, e.g. an unknown
    /// move symbol or a malformed room code.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
