use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandshakeError {
    /// Only RTMP version 3 is supported.  Encrypted variants (6 and 8) and anything else
    /// are rejected.
    #[error("Handshake started with unsupported RTMP version {version}, expected 3")]
    BadVersionId { version: u8 },

    #[error("Handshake bytes were received after the handshake had already completed")]
    HandshakeAlreadyCompleted,

    #[error("Could not create an HMAC-SHA256 digest with the provided key")]
    InvalidDigestKey,
}
