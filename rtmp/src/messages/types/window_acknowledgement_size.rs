use bytes::{BufMut, Bytes, BytesMut};

use crate::cursor::ByteCursor;
use crate::messages::MessageDeserializationError;

/// Notifies the peer how many bytes should be received before sending an `Acknowledgement`
#[derive(PartialEq, Debug, Clone)]
pub struct SetWindowAckSize {
    pub ack_window_size: u32,
}

impl SetWindowAckSize {
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(4);
        bytes.put_u32(self.ack_window_size);
        bytes.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut cursor = ByteCursor::new(payload);
        Ok(SetWindowAckSize {
            ack_window_size: cursor.read_u32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, WriteBytesExt};

    #[test]
    fn can_serialize_message() {
        let mut expected = Vec::new();
        expected.write_u32::<BigEndian>(25).unwrap();

        let bytes = SetWindowAckSize { ack_window_size: 25 }.encode();
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn can_deserialize_message() {
        let mut bytes = Vec::new();
        bytes.write_u32::<BigEndian>(2_500_000).unwrap();

        let packet = SetWindowAckSize::decode(&bytes).unwrap();
        assert_eq!(packet.ack_window_size, 2_500_000);
    }

    #[test]
    fn gives_error_on_truncated_payload() {
        assert!(SetWindowAckSize::decode(&[0, 0, 1]).is_err());
    }
}
