use bytes::{BufMut, Bytes, BytesMut};

use crate::cursor::ByteCursor;
use crate::messages::MessageDeserializationError;

/// Events and notifications that are raised with the peer
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum UserControlEvent {
    /// Notifies the client that a stream has become functional
    StreamBegin { stream_id: u32 },

    /// Notifies the client that the playback of data on the stream is over
    StreamEof { stream_id: u32 },

    /// Notifies the client that there is no more data on the stream.
    StreamDry { stream_id: u32 },

    /// Notifies the server of the buffer size (in milliseconds) that the client is using
    SetBufferLength { stream_id: u32, buffer_length: u32 },

    /// Notifies the client that the stream is a recorded stream.
    StreamIsRecorded { stream_id: u32 },

    /// Sent to test whether the peer is reachable
    PingRequest { timestamp: u32 },

    /// Answer to a ping request, carrying the request's timestamp
    PingResponse { timestamp: u32 },
}

impl UserControlEvent {
    pub fn event_id(&self) -> u16 {
        match *self {
            UserControlEvent::StreamBegin { .. } => 0,
            UserControlEvent::StreamEof { .. } => 1,
            UserControlEvent::StreamDry { .. } => 2,
            UserControlEvent::SetBufferLength { .. } => 3,
            UserControlEvent::StreamIsRecorded { .. } => 4,
            UserControlEvent::PingRequest { .. } => 6,
            UserControlEvent::PingResponse { .. } => 7,
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct UserControl {
    pub event: UserControlEvent,
}

impl UserControl {
    pub fn new(event: UserControlEvent) -> Self {
        UserControl { event }
    }

    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(10);
        bytes.put_u16(self.event.event_id());

        match self.event {
            UserControlEvent::StreamBegin { stream_id }
            | UserControlEvent::StreamEof { stream_id }
            | UserControlEvent::StreamDry { stream_id }
            | UserControlEvent::StreamIsRecorded { stream_id } => bytes.put_u32(stream_id),

            UserControlEvent::SetBufferLength {
                stream_id,
                buffer_length,
            } => {
                bytes.put_u32(stream_id);
                bytes.put_u32(buffer_length);
            }

            UserControlEvent::PingRequest { timestamp } | UserControlEvent::PingResponse { timestamp } => {
                bytes.put_u32(timestamp)
            }
        }

        bytes.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut cursor = ByteCursor::new(payload);
        let event = match cursor.read_u16()? {
            0 => UserControlEvent::StreamBegin {
                stream_id: cursor.read_u32()?,
            },

            1 => UserControlEvent::StreamEof {
                stream_id: cursor.read_u32()?,
            },

            2 => UserControlEvent::StreamDry {
                stream_id: cursor.read_u32()?,
            },

            3 => UserControlEvent::SetBufferLength {
                stream_id: cursor.read_u32()?,
                buffer_length: cursor.read_u32()?,
            },

            4 => UserControlEvent::StreamIsRecorded {
                stream_id: cursor.read_u32()?,
            },

            6 => UserControlEvent::PingRequest {
                timestamp: cursor.read_u32()?,
            },

            7 => UserControlEvent::PingResponse {
                timestamp: cursor.read_u32()?,
            },

            event_id => return Err(MessageDeserializationError::UnknownUserControlEvent { event_id }),
        };

        Ok(UserControl { event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, WriteBytesExt};

    #[test]
    fn can_serialize_stream_begin_message() {
        let mut expected = Vec::new();
        expected.write_u16::<BigEndian>(0).unwrap();
        expected.write_u32::<BigEndian>(555).unwrap();

        let packet = UserControl::new(UserControlEvent::StreamBegin { stream_id: 555 });
        assert_eq!(&packet.encode()[..], &expected[..]);
    }

    #[test]
    fn can_deserialize_set_buffer_length_message() {
        let mut bytes = Vec::new();
        bytes.write_u16::<BigEndian>(3).unwrap();
        bytes.write_u32::<BigEndian>(1).unwrap();
        bytes.write_u32::<BigEndian>(3000).unwrap();

        let packet = UserControl::decode(&bytes).unwrap();
        assert_eq!(
            packet.event,
            UserControlEvent::SetBufferLength {
                stream_id: 1,
                buffer_length: 3000
            }
        );
    }

    #[test]
    fn can_round_trip_ping_events() {
        for event in &[
            UserControlEvent::PingRequest { timestamp: 1234 },
            UserControlEvent::PingResponse { timestamp: 5678 },
            UserControlEvent::StreamEof { stream_id: 3 },
            UserControlEvent::StreamDry { stream_id: 4 },
            UserControlEvent::StreamIsRecorded { stream_id: 5 },
        ] {
            let bytes = UserControl::new(*event).encode();
            assert_eq!(UserControl::decode(&bytes).unwrap().event, *event);
        }
    }

    #[test]
    fn gives_error_on_unknown_event() {
        let bytes = [0, 31, 0, 0, 0, 1];
        match UserControl::decode(&bytes) {
            Err(MessageDeserializationError::UnknownUserControlEvent { event_id: 31 }) => (),
            x => panic!("Expected UnknownUserControlEvent, received {:?}", x),
        }
    }

    #[test]
    fn gives_error_on_missing_buffer_length() {
        let bytes = [0, 3, 0, 0, 0, 1];
        match UserControl::decode(&bytes) {
            Err(MessageDeserializationError::Truncated(_)) => (),
            x => panic!("Expected Truncated, received {:?}", x),
        }
    }
}
