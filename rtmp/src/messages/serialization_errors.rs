use lms_amf0::Amf0SerializationError;
use thiserror::Error;

/// Enumeration that represents the various errors that may occur while trying to
/// serialize a packet into a raw RTMP payload.
#[derive(Debug, Error)]
pub enum MessageSerializationError {
    /// An invalid chunk size value was provided
    #[error("Cannot serialize a SetChunkSize message with a size of {size}, it must be between 1 and 2147483647")]
    InvalidChunkSize { size: u32 },

    /// The values provided could not be serialized into valid AMF0 encoded data
    #[error("The values provided could not be serialized into valid AMF0 encoded data: {0}")]
    Amf0SerializationError(#[from] Amf0SerializationError),
}
