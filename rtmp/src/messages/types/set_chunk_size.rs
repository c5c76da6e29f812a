use bytes::{BufMut, Bytes, BytesMut};

use crate::cursor::ByteCursor;
use crate::messages::{MessageDeserializationError, MessageSerializationError};

const MAX_SIZE: u32 = 0x8000_0000 - 1;

/// Tells the peer that the maximum chunk size for RTMP chunks it will be receiving is changing
/// to the specified size.
#[derive(PartialEq, Debug, Clone)]
pub struct SetChunkSize {
    pub chunk_size: u32,
}

impl SetChunkSize {
    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        if self.chunk_size == 0 || self.chunk_size > MAX_SIZE {
            return Err(MessageSerializationError::InvalidChunkSize { size: self.chunk_size });
        }

        let mut bytes = BytesMut::with_capacity(4);
        bytes.put_u32(self.chunk_size);
        Ok(bytes.freeze())
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut cursor = ByteCursor::new(payload);
        let chunk_size = cursor.read_u32()?;

        if chunk_size == 0 || chunk_size > MAX_SIZE {
            return Err(MessageDeserializationError::InvalidMessageFormat);
        }

        Ok(SetChunkSize { chunk_size })
    }
}
