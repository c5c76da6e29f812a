use crate::cursor::CursorError;
use lms_amf0::Amf0DeserializationError;
use thiserror::Error;

/// Enumeration that represents the various errors that may occur while trying to
/// deserialize a RTMP message into a packet
#[derive(Debug, Error)]
pub enum MessageDeserializationError {
    /// The bytes or amf0 values contained in the message were not what were expected, and thus
    /// the message could not be parsed.
    #[error("The message was not encoded in an expected format")]
    InvalidMessageFormat,

    /// A command or data message did not start with the expected name
    #[error("Expected a '{expected}' message but received '{received}'")]
    UnexpectedCommandName { expected: &'static str, received: String },

    /// A required value was absent or was not of the expected amf0 type
    #[error("The '{field}' field was missing or had an unexpected type")]
    InvalidField { field: &'static str },

    #[error("User control event {event_id} is not supported")]
    UnknownUserControlEvent { event_id: u16 },

    /// The bytes in the message that were expected to be AMF0 values were not properly encoded,
    /// and thus could not be read
    #[error("The message did not contain valid Amf0 encoded values: {0}")]
    Amf0DeserializationError(#[from] Amf0DeserializationError),

    /// A binary control message was shorter than its fixed layout
    #[error("The message was truncated: {0}")]
    Truncated(#[from] CursorError),
}
