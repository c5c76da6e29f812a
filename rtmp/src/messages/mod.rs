/*!
This module contains the RTMP message model as well as the typed packets carried inside
command, data and protocol control messages.

A `Message` is what the chunk layer produces and consumes: a type id, a timestamp, a message
stream id and an opaque payload.  The packets in this module give that payload meaning, each
with an `encode()` and `decode()` pair, and `Packet::into_message()` wraps an encoded packet
in a `Message` with the type id and chunk stream it is expected on.
*/

mod aggregate;
mod deserialization_errors;
mod message;
mod packet;
mod serialization_errors;
pub mod status;
mod types;

pub use self::aggregate::{AggregateError, AggregateSplitter};
pub use self::deserialization_errors::MessageDeserializationError;
pub use self::message::Message;
pub use self::packet::Packet;
pub use self::serialization_errors::MessageSerializationError;
pub use self::types::*;

/// Message type ids
pub mod message_type {
    pub const SET_CHUNK_SIZE: u8 = 1;
    pub const ABORT: u8 = 2;
    pub const ACKNOWLEDGEMENT: u8 = 3;
    pub const USER_CONTROL: u8 = 4;
    pub const WINDOW_ACK_SIZE: u8 = 5;
    pub const SET_PEER_BANDWIDTH: u8 = 6;
    pub const AUDIO: u8 = 8;
    pub const VIDEO: u8 = 9;
    pub const AMF3_DATA: u8 = 15;
    pub const AMF3_SHARED_OBJECT: u8 = 16;
    pub const AMF3_COMMAND: u8 = 17;
    pub const AMF0_DATA: u8 = 18;
    pub const AMF0_SHARED_OBJECT: u8 = 19;
    pub const AMF0_COMMAND: u8 = 20;
    pub const AGGREGATE: u8 = 22;
}

/// Chunk stream ids outgoing messages are sent on
pub mod chunk_stream_id {
    pub const PROTOCOL_CONTROL: u32 = 2;
    pub const CONNECTION: u32 = 3;
    pub const STREAM: u32 = 5;
    pub const VIDEO: u32 = 6;
    pub const AUDIO: u32 = 7;
}
