use super::message_type;
use bytes::Bytes;

/// A fully reassembled RTMP message, prior to interpretation
#[derive(PartialEq, Debug, Clone)]
pub struct Message {
    pub message_type: u8,

    /// Milliseconds.  Received timestamps are kept to 31 bits.
    pub timestamp: u32,

    /// Difference from the previous message on the same chunk stream.  For a message that
    /// arrived with a full header this is the absolute timestamp.
    pub timestamp_delta: u32,

    pub stream_id: u32,

    /// The chunk stream the message arrived on, or the one it should be sent out on
    pub preferred_chunk_stream_id: u32,

    pub payload: Bytes,
}

impl Message {
    pub fn new(
        message_type: u8,
        timestamp: u32,
        stream_id: u32,
        preferred_chunk_stream_id: u32,
        payload: Bytes,
    ) -> Message {
        Message {
            message_type,
            timestamp,
            timestamp_delta: timestamp,
            stream_id,
            preferred_chunk_stream_id,
            payload,
        }
    }

    pub fn payload_length(&self) -> u32 {
        self.payload.len() as u32
    }

    pub fn is_audio(&self) -> bool {
        self.message_type == message_type::AUDIO
    }

    pub fn is_video(&self) -> bool {
        self.message_type == message_type::VIDEO
    }

    pub fn is_aggregate(&self) -> bool {
        self.message_type == message_type::AGGREGATE
    }

    pub fn is_command(&self) -> bool {
        self.message_type == message_type::AMF0_COMMAND || self.message_type == message_type::AMF3_COMMAND
    }

    pub fn is_data(&self) -> bool {
        self.message_type == message_type::AMF0_DATA || self.message_type == message_type::AMF3_DATA
    }

    /// The AMF0 encoded part of a command or data message.  AMF3 framed messages carry one
    /// leading format byte in front of otherwise AMF0 encoded values.
    pub fn amf0_payload(&self) -> &[u8] {
        match self.message_type {
            message_type::AMF3_COMMAND | message_type::AMF3_DATA if !self.payload.is_empty() => {
                &self.payload[1..]
            }
            _ => &self.payload[..],
        }
    }
}
