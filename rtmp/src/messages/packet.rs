use bytes::Bytes;

use super::types::*;
use super::{chunk_stream_id, message_type, Message, MessageSerializationError};

/// Every command, data and control message this crate can encode
#[derive(PartialEq, Debug, Clone)]
pub enum Packet {
    Abort(Abort),
    Acknowledgement(Acknowledgement),
    CloseStream(CloseStream),
    ConnectApp(ConnectApp),
    ConnectAppResponse(ConnectAppResponse),
    CreateStream(CreateStream),
    CreateStreamResponse(CreateStreamResponse),
    DeleteStream(DeleteStream),
    FmleStart(FmleStart),
    FmleStartResponse(FmleStartResponse),
    OnError(OnError),
    OnMetaData(OnMetaData),
    OnStatusCall(OnStatusCall),
    OnStatusData(OnStatusData),
    Play(Play),
    Publish(Publish),
    SampleAccess(SampleAccess),
    SetChunkSize(SetChunkSize),
    SetWindowAckSize(SetWindowAckSize),
    UserControl(UserControl),
}

impl Packet {
    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        match self {
            Packet::Abort(packet) => Ok(packet.encode()),
            Packet::Acknowledgement(packet) => Ok(packet.encode()),
            Packet::CloseStream(packet) => packet.encode(),
            Packet::ConnectApp(packet) => packet.encode(),
            Packet::ConnectAppResponse(packet) => packet.encode(),
            Packet::CreateStream(packet) => packet.encode(),
            Packet::CreateStreamResponse(packet) => packet.encode(),
            Packet::DeleteStream(packet) => packet.encode(),
            Packet::FmleStart(packet) => packet.encode(),
            Packet::FmleStartResponse(packet) => packet.encode(),
            Packet::OnError(packet) => packet.encode(),
            Packet::OnMetaData(packet) => packet.encode(),
            Packet::OnStatusCall(packet) => packet.encode(),
            Packet::OnStatusData(packet) => packet.encode(),
            Packet::Play(packet) => packet.encode(),
            Packet::Publish(packet) => packet.encode(),
            Packet::SampleAccess(packet) => packet.encode(),
            Packet::SetChunkSize(packet) => packet.encode(),
            Packet::SetWindowAckSize(packet) => Ok(packet.encode()),
            Packet::UserControl(packet) => Ok(packet.encode()),
        }
    }

    pub fn message_type(&self) -> u8 {
        match self {
            Packet::Abort(_) => message_type::ABORT,
            Packet::Acknowledgement(_) => message_type::ACKNOWLEDGEMENT,
            Packet::SetChunkSize(_) => message_type::SET_CHUNK_SIZE,
            Packet::SetWindowAckSize(_) => message_type::WINDOW_ACK_SIZE,
            Packet::UserControl(_) => message_type::USER_CONTROL,
            Packet::OnMetaData(_) | Packet::OnStatusData(_) | Packet::SampleAccess(_) => message_type::AMF0_DATA,
            _ => message_type::AMF0_COMMAND,
        }
    }

    /// Protocol control goes on chunk stream 2, connection level commands on 3 and anything
    /// tied to a message stream on 5.
    pub fn preferred_chunk_stream_id(&self) -> u32 {
        match self {
            Packet::Abort(_)
            | Packet::Acknowledgement(_)
            | Packet::SetChunkSize(_)
            | Packet::SetWindowAckSize(_)
            | Packet::UserControl(_) => chunk_stream_id::PROTOCOL_CONTROL,

            Packet::ConnectApp(_)
            | Packet::ConnectAppResponse(_)
            | Packet::CreateStream(_)
            | Packet::CreateStreamResponse(_)
            | Packet::DeleteStream(_)
            | Packet::FmleStart(_)
            | Packet::FmleStartResponse(_)
            | Packet::OnError(_) => chunk_stream_id::CONNECTION,

            Packet::CloseStream(_)
            | Packet::OnMetaData(_)
            | Packet::OnStatusCall(_)
            | Packet::OnStatusData(_)
            | Packet::Play(_)
            | Packet::Publish(_)
            | Packet::SampleAccess(_) => chunk_stream_id::STREAM,
        }
    }

    /// Encodes the packet into a message ready for the chunk serializer
    pub fn into_message(self, timestamp: u32, stream_id: u32) -> Result<Message, MessageSerializationError> {
        let payload = self.encode()?;
        Ok(Message::new(
            self.message_type(),
            timestamp,
            stream_id,
            self.preferred_chunk_stream_id(),
            payload,
        ))
    }
}

macro_rules! packet_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Packet {
                fn from(packet: $variant) -> Self {
                    Packet::$variant(packet)
                }
            }
        )*
    };
}

packet_from!(
    Abort,
    Acknowledgement,
    CloseStream,
    ConnectApp,
    ConnectAppResponse,
    CreateStream,
    CreateStreamResponse,
    DeleteStream,
    FmleStart,
    FmleStartResponse,
    OnError,
    OnMetaData,
    OnStatusCall,
    OnStatusData,
    Play,
    Publish,
    SampleAccess,
    SetChunkSize,
    SetWindowAckSize,
    UserControl
);
