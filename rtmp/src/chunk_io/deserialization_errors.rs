use thiserror::Error;

/// An enumeration defining all the possible errors that could occur while deserializing
/// RTMP chunks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkDeserializationError {
    /// Chunks that are not type 0 rely on the previous header received on the same chunk
    /// stream id.  This occurs when a type 2 or type 3 chunk arrives on a chunk stream that
    /// has never carried a header.
    #[error("Received chunk with header format {format} on csid {csid} prior to receiving a type 0 chunk")]
    NoPreviousChunkOnStream { csid: u32, format: u8 },

    /// A type 0 chunk started a new message on a chunk stream whose previous message had not
    /// received all of its payload yet.
    #[error("New message started on csid {csid} with {received} of {expected} bytes of the previous message received")]
    PreviousMessageIncomplete {
        csid: u32,
        received: usize,
        expected: usize,
    },

    /// A type 1 chunk in the middle of a message declared a different message length
    #[error("Message length on csid {csid} changed from {previous} to {new} part way through the message")]
    MessageLengthChanged { csid: u32, previous: u32, new: u32 },

    /// The max chunk size does not allow chunk sizes more than 2,147,483,647 (since it's
    /// encoded in only 31 bits of the SetChunkSize message), and must be at least 1.
    #[error("Requested an invalid max chunk size of {chunk_size}.  Chunk sizes must be between 1 and 2147483647")]
    InvalidMaxChunkSize { chunk_size: usize },
}
