use bytes::{BufMut, Bytes, BytesMut};

use crate::cursor::ByteCursor;
use crate::messages::MessageDeserializationError;

/// Notifies the peer that if it is waiting for chunks to complete a message on the given chunk
/// stream, it should discard the chunks it has already received.
#[derive(PartialEq, Debug, Clone)]
pub struct Abort {
    pub chunk_stream_id: u32,
}

impl Abort {
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(4);
        bytes.put_u32(self.chunk_stream_id);
        bytes.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut cursor = ByteCursor::new(payload);
        Ok(Abort {
            chunk_stream_id: cursor.read_u32()?,
        })
    }
}
