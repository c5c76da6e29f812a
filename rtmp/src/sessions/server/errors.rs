use crate::chunk_io::{ChunkDeserializationError, ChunkSerializationError};
use crate::handshake::HandshakeError;
use crate::messages::{AggregateError, MessageDeserializationError, MessageSerializationError};
use std::io;
use thiserror::Error;

/// Error type handlers return to abort the session's read loop
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Broad classification of a `ServerSessionError`, for callers that log or count failures
/// by cause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerSessionErrorKind {
    /// The peer sent malformed chunks, packets or aggregates
    Protocol,

    /// The handshake could not be completed
    Handshake,

    /// A connect, publish or play request was refused
    RefusedByPolicy,

    /// Writing to the transport failed
    Transport,

    /// A handler asked for the session to stop
    Handler,

    /// The session was already closed by an earlier error
    Closed,
}

/// Represents the errors a server session can run into.  Any of them closes the session.
#[derive(Debug, Error)]
pub enum ServerSessionError {
    #[error("The handshake failed: {0}")]
    Handshake(#[from] HandshakeError),

    /// Encountered when an error occurs while deserializing the incoming byte data
    #[error("An error occurred deserializing incoming data: {0}")]
    ChunkDeserializationError(#[from] ChunkDeserializationError),

    /// Encountered when an error occurs while serializing outbound messages
    #[error("An error occurred serializing outbound messages: {0}")]
    ChunkSerializationError(#[from] ChunkSerializationError),

    /// Encountered when an error occurs while turning a packet into a message payload
    #[error("An error occurred while attempting to turn a packet into a message payload: {0}")]
    MessageSerializationError(#[from] MessageSerializationError),

    /// Encountered when an error occurs while turning a message payload into a packet
    #[error("An error occurred while attempting to turn a message payload into a packet: {0}")]
    MessageDeserializationError(#[from] MessageDeserializationError),

    #[error("An aggregate message was malformed: {0}")]
    AggregateError(#[from] AggregateError),

    #[error("The connect request was refused")]
    ConnectRefused,

    #[error("The publish request was refused")]
    PublishRefused,

    #[error("The play request was refused")]
    PlayRefused,

    #[error("Writing to the transport failed: {0}")]
    Io(#[from] io::Error),

    #[error("The session handler failed: {0}")]
    Handler(#[source] HandlerError),

    #[error("The session has already been closed")]
    SessionClosed,
}

impl ServerSessionError {
    pub fn kind(&self) -> ServerSessionErrorKind {
        match self {
            ServerSessionError::Handshake(_) => ServerSessionErrorKind::Handshake,

            ServerSessionError::ChunkDeserializationError(_)
            | ServerSessionError::ChunkSerializationError(_)
            | ServerSessionError::MessageSerializationError(_)
            | ServerSessionError::MessageDeserializationError(_)
            | ServerSessionError::AggregateError(_) => ServerSessionErrorKind::Protocol,

            ServerSessionError::ConnectRefused
            | ServerSessionError::PublishRefused
            | ServerSessionError::PlayRefused => ServerSessionErrorKind::RefusedByPolicy,

            ServerSessionError::Io(_) => ServerSessionErrorKind::Transport,
            ServerSessionError::Handler(_) => ServerSessionErrorKind::Handler,
            ServerSessionError::SessionClosed => ServerSessionErrorKind::Closed,
        }
    }
}
