use super::chunk_header::{
    write_basic_header, ChunkHeaderFormat, MAX_CHUNK_STREAM_ID, MAX_MESSAGE_LENGTH, MAX_TIMESTAMP_FIELD,
    MIN_CHUNK_STREAM_ID,
};
use super::{ChunkSerializationError, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::messages::Message;
use bytes::{BufMut, Bytes, BytesMut};

/// Allows serializing RTMP messages into RTMP chunks.
///
/// Every message starts with a type 0 chunk carrying the full header, and any part of the
/// payload past the max chunk size follows in type 3 continuation chunks.  No header
/// compression across messages is attempted, so the serializer holds no per chunk stream
/// state and any message can be dropped before being written without confusing the peer.
pub struct ChunkSerializer {
    max_chunk_size: usize,
}

impl ChunkSerializer {
    /// Creates a new `ChunkSerializer`.
    ///
    /// By default (per the RTMP specification) the serializer will break any message into RTMP
    /// chunks with a max size of 128.  To change this amount a call to `set_max_chunk_size()` is
    /// required.
    pub fn new() -> ChunkSerializer {
        ChunkSerializer {
            max_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Changes the maximum amount of bytes from RTMP messages that can be in a single RTMP chunk.
    ///
    /// The peer must be told about the change with a `SetChunkSize` message, and that message
    /// has to be serialized *before* this is called.
    pub fn set_max_chunk_size(&mut self, new_size: usize) -> Result<(), ChunkSerializationError> {
        if new_size == 0 || new_size > MAX_CHUNK_SIZE {
            return Err(ChunkSerializationError::InvalidMaxChunkSize {
                attempted_chunk_size: new_size,
            });
        }

        self.max_chunk_size = new_size;
        Ok(())
    }

    pub fn get_max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Turns an RTMP message into the bytes of one or more RTMP chunks, sent on the message's
    /// preferred chunk stream.
    pub fn serialize(&self, message: &Message) -> Result<Bytes, ChunkSerializationError> {
        let mut bytes = BytesMut::new();
        self.serialize_into(message, &mut bytes)?;
        Ok(bytes.freeze())
    }

    /// Same as `serialize()` but appends the chunks to an existing buffer.  Nothing is written
    /// when an error is returned.
    pub fn serialize_into(&self, message: &Message, bytes: &mut BytesMut) -> Result<(), ChunkSerializationError> {
        let csid = message.preferred_chunk_stream_id;
        if csid < MIN_CHUNK_STREAM_ID || csid > MAX_CHUNK_STREAM_ID {
            return Err(ChunkSerializationError::InvalidChunkStreamId { csid });
        }

        let payload = &message.payload[..];
        if payload.len() > MAX_MESSAGE_LENGTH {
            return Err(ChunkSerializationError::MessageTooLong { size: payload.len() });
        }

        let has_extended_timestamp = message.timestamp >= MAX_TIMESTAMP_FIELD;
        let timestamp_field = if has_extended_timestamp {
            MAX_TIMESTAMP_FIELD
        } else {
            message.timestamp
        };

        let chunk_count = (payload.len() + self.max_chunk_size - 1) / self.max_chunk_size;
        bytes.reserve(payload.len() + 18 + chunk_count.saturating_sub(1) * 7);

        write_basic_header(bytes, ChunkHeaderFormat::Full, csid);
        put_u24(bytes, timestamp_field);
        put_u24(bytes, payload.len() as u32);
        bytes.put_u8(message.message_type);
        bytes.put_u32_le(message.stream_id);
        if has_extended_timestamp {
            bytes.put_u32(message.timestamp);
        }

        // An empty payload still produces the one type 0 chunk
        let mut slices = payload.chunks(self.max_chunk_size);
        if let Some(first) = slices.next() {
            bytes.put_slice(first);
        }

        for slice in slices {
            write_basic_header(bytes, ChunkHeaderFormat::Empty, csid);
            if has_extended_timestamp {
                bytes.put_u32(message.timestamp);
            }

            bytes.put_slice(slice);
        }

        Ok(())
    }
}

impl Default for ChunkSerializer {
    fn default() -> Self {
        ChunkSerializer::new()
    }
}

fn put_u24(bytes: &mut BytesMut, value: u32) {
    bytes.put_u8((value >> 16) as u8);
    bytes.put_u8((value >> 8) as u8);
    bytes.put_u8(value as u8);
}
