use bytes::{BufMut, Bytes, BytesMut};

use crate::cursor::ByteCursor;
use crate::messages::MessageDeserializationError;

/// Reports the total number of bytes received so far, sent once the peer's acknowledgement
/// window has been filled.
#[derive(PartialEq, Debug, Clone)]
pub struct Acknowledgement {
    pub sequence_number: u32,
}

impl Acknowledgement {
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(4);
        bytes.put_u32(self.sequence_number);
        bytes.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut cursor = ByteCursor::new(payload);
        Ok(Acknowledgement {
            sequence_number: cursor.read_u32()?,
        })
    }
}
