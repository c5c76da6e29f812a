//! Splitting RTMP messages into chunks and reassembling them on the other side.
//!
//! Each chunk starts with a basic header (format and chunk stream id) followed by a message
//! header whose size depends on the format:
//!
//! | format | fields                                         |
//! |--------|------------------------------------------------|
//! | 0      | timestamp, length, type id, message stream id  |
//! | 1      | timestamp delta, length, type id               |
//! | 2      | timestamp delta                                |
//! | 3      | none, everything comes from the previous chunk |

mod chunk_header;
mod deserialization_errors;
mod deserializer;
mod serialization_errors;
mod serializer;

pub use self::chunk_header::{MAX_CHUNK_STREAM_ID, MAX_MESSAGE_LENGTH, MIN_CHUNK_STREAM_ID};
pub use self::deserialization_errors::ChunkDeserializationError;
pub use self::deserializer::{ChunkDeserializer, ReadStatus};
pub use self::serialization_errors::ChunkSerializationError;
pub use self::serializer::ChunkSerializer;

/// Chunk size both sides use until a SetChunkSize message says otherwise
pub const DEFAULT_CHUNK_SIZE: usize = 128;

/// The chunk size is carried in 31 bits
pub const MAX_CHUNK_SIZE: usize = 0x7FFF_FFFF;
