use thiserror::Error;

/// An enumeration defining all the possible errors that could occur while serializing
/// RTMP messages into RTMP chunks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkSerializationError {
    /// RTMP specification states that a message cannot be more than 16777215, even when split
    /// across multiple RTMP chunks
    #[error("The current message has a length of {size} bytes, which is over the allowed size of 16777215 bytes")]
    MessageTooLong { size: usize },

    /// Encountered when the chunk size is set to an invalid value
    #[error("An invalid chunk size of {attempted_chunk_size} was specified.  Chunk size must be between 1 and 2147483647")]
    InvalidMaxChunkSize { attempted_chunk_size: usize },

    #[error("Chunk stream id {csid} is outside of the allowed range of 2 to 65599")]
    InvalidChunkStreamId { csid: u32 },
}
