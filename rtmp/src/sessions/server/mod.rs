mod config;
mod errors;
mod flow_control;
mod handler;
mod request;


use bytes::BytesMut;
use lms_amf0::Amf0Object;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

use self::flow_control::AcknowledgementWindow;
use crate::chunk_io::{ChunkDeserializer, ChunkSerializationError, ChunkSerializer, ReadStatus, MAX_CHUNK_SIZE};
use crate::handshake::{Handshake, HandshakeProgress};
use crate::messages::names::*;
use crate::messages::{chunk_stream_id, message_type, status};
use crate::messages::{
    read_command_name, status_object, Abort, Acknowledgement, AggregateSplitter, CloseStream, ConnectApp,
    ConnectAppResponse, CreateStream, CreateStreamResponse, DeleteStream, FmleStart, FmleStartResponse, Message,
    MessageDeserializationError, OnError, OnMetaData, OnStatusCall, OnStatusData, Packet, Play, Publish, SampleAccess, SetChunkSize,
    SetWindowAckSize, UserControl, UserControlEvent,
};

pub use self::config::ServerSessionConfig;
pub use self::errors::{HandlerError, ServerSessionError, ServerSessionErrorKind};
pub use self::handler::{Decision, ServerSessionHandler};
pub use self::request::Request;

/// Where a `ServerSession` is in the life of its connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No bytes have been received yet
    Init,

    Handshaking,

    /// The handshake is done and chunks are being read and dispatched
    Dispatching,

    /// An error occurred.  The session will not do anything else.
    Closed,
}

/// A session that represents the server side of a single RTMP connection.
///
/// The `ServerSession` performs the handshake, parses RTMP chunks coming in from a client into
/// RTMP messages and runs the common server side workflows for those messages.  Decisions and
/// media are handed to a `ServerSessionHandler`, and everything the session sends is written to
/// its transport in order.
///
/// The `ServerSession` never reads from the network itself.  Every byte received from the
/// client must be passed to `handle_input()` in order, in whatever fragments it arrived in.
/// Partial handshake packets and partial chunks are kept until the rest arrives.
///
/// Any error closes the session for good.  The error is returned once and every later call
/// returns `ServerSessionError::SessionClosed`.
pub struct ServerSession<W: Write, H: ServerSessionHandler> {
    config: ServerSessionConfig,
    transport: W,
    handler: H,
    state: SessionState,
    handshake: Option<Handshake>,
    read_buffer: BytesMut,
    deserializer: ChunkDeserializer,
    serializer: ChunkSerializer,
    ack_window: AcknowledgementWindow,
    total_bytes_received: u64,
    out_chunk_size: u32,
    player_buffer_length: u32,
    object_encoding: f64,
    publishing: bool,
    request: Request,
    connect_packet: Option<Arc<ConnectApp>>,
}

impl<W: Write, H: ServerSessionHandler> ServerSession<W, H> {
    /// Creates a new server session writing to `transport`.
    ///
    /// Both chunk sizes start at the protocol default of 128.  The configured outbound chunk
    /// size is only negotiated once a publish or play request is accepted.
    pub fn new(config: ServerSessionConfig, transport: W, handler: H) -> Self {
        ServerSession {
            ack_window: AcknowledgementWindow::new(config.receive_ack_window),
            out_chunk_size: config.out_chunk_size,
            player_buffer_length: config.player_buffer_length,
            config,
            transport,
            handler,
            state: SessionState::Init,
            handshake: None,
            read_buffer: BytesMut::new(),
            deserializer: ChunkDeserializer::new(),
            serializer: ChunkSerializer::new(),
            total_bytes_received: 0,
            object_encoding: 0.0,
            publishing: false,
            request: Request::new(),
            connect_packet: None,
        }
    }

    /// Takes in bytes received from the client and reacts to everything that can be fully
    /// read from them.
    ///
    /// Running out of bytes mid packet is not an error.  The remainder is kept until the next
    /// call.
    pub fn handle_input(&mut self, bytes: &[u8]) -> Result<(), ServerSessionError> {
        if self.state == SessionState::Closed {
            return Err(ServerSessionError::SessionClosed);
        }

        self.total_bytes_received += bytes.len() as u64;
        self.read_buffer.extend_from_slice(bytes);

        let result = self.process_buffer();
        self.close_on_error(result)
    }

    /// Answers the client's `connect` request.
    ///
    /// Refusing sends an `_error` to the client and returns `ServerSessionError::ConnectRefused`,
    /// closing the session.
    pub fn respond_connect(&mut self, allow: bool) -> Result<(), ServerSessionError> {
        self.ensure_open()?;
        let result = self.accept_or_refuse_connect(allow);
        self.close_on_error(result)
    }

    /// Answers the client's `publish` request.  Refusing returns
    /// `ServerSessionError::PublishRefused` without sending anything.
    pub fn respond_publish(&mut self, allow: bool) -> Result<(), ServerSessionError> {
        self.ensure_open()?;
        let result = self.accept_or_refuse_publish(allow);
        self.close_on_error(result)
    }

    /// Answers the client's `play` request.  Refusing returns `ServerSessionError::PlayRefused`
    /// without sending anything.
    pub fn respond_play(&mut self, allow: bool) -> Result<(), ServerSessionError> {
        self.ensure_open()?;
        let result = self.accept_or_refuse_play(allow);
        self.close_on_error(result)
    }

    /// Sends an audio or video message to a playing client on the session's stream id
    pub fn send_av_data(&mut self, mut message: Message) -> Result<(), ServerSessionError> {
        self.ensure_open()?;

        message.stream_id = self.config.stream_id;
        if message.is_audio() {
            message.preferred_chunk_stream_id = chunk_stream_id::AUDIO;
        } else if message.is_video() {
            message.preferred_chunk_stream_id = chunk_stream_id::VIDEO;
        }

        let result = self.send_message(&message);
        self.close_on_error(result)
    }

    /// Relays stream metadata to a playing client
    pub fn send_metadata(&mut self, metadata: &OnMetaData) -> Result<(), ServerSessionError> {
        self.ensure_open()?;
        let stream_id = self.config.stream_id;
        let result = self.send_packet(metadata.clone(), stream_id);
        self.close_on_error(result)
    }

    /// Changes the chunk size negotiated by the next accepted publish or play request.  The
    /// size must be between 1 and 2147483647.
    pub fn set_out_chunk_size(&mut self, chunk_size: u32) -> Result<(), ChunkSerializationError> {
        if chunk_size == 0 || chunk_size as usize > MAX_CHUNK_SIZE {
            return Err(ChunkSerializationError::InvalidMaxChunkSize {
                attempted_chunk_size: chunk_size as usize,
            });
        }

        self.out_chunk_size = chunk_size;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The `connect` command the client opened the session with
    pub fn connect_packet(&self) -> Option<Arc<ConnectApp>> {
        self.connect_packet.clone()
    }

    /// Milliseconds of media the client says it buffers
    pub fn player_buffer_length(&self) -> u32 {
        self.player_buffer_length
    }

    pub fn object_encoding(&self) -> f64 {
        self.object_encoding
    }

    /// Every byte passed to `handle_input()` so far
    pub fn total_bytes_received(&self) -> u64 {
        self.total_bytes_received
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn transport(&self) -> &W {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut W {
        &mut self.transport
    }

    fn ensure_open(&self) -> Result<(), ServerSessionError> {
        match self.state {
            SessionState::Closed => Err(ServerSessionError::SessionClosed),
            _ => Ok(()),
        }
    }

    fn close_on_error(&mut self, result: Result<(), ServerSessionError>) -> Result<(), ServerSessionError> {
        if let Err(error) = &result {
            error!("Closing session ({:?}): {}", error.kind(), error);
            self.state = SessionState::Closed;
        }

        result
    }

    fn process_buffer(&mut self) -> Result<(), ServerSessionError> {
        loop {
            match self.state {
                SessionState::Init => self.state = SessionState::Handshaking,

                SessionState::Handshaking => {
                    let handshake = self.handshake.get_or_insert_with(Handshake::new);
                    match handshake.advance(&mut self.read_buffer)? {
                        HandshakeProgress::NeedMoreData => return Ok(()),
                        HandshakeProgress::Respond(response) => self.transport.write_all(&response)?,
                        HandshakeProgress::Done => {
                            self.handshake = None;
                            self.state = SessionState::Dispatching;
                        }
                    }
                }

                SessionState::Dispatching => match self.deserializer.read(&mut self.read_buffer)? {
                    ReadStatus::NeedMoreData => return Ok(()),
                    ReadStatus::ChunkConsumed => (),
                    ReadStatus::MessageReady => {
                        while let Some(message) = self.deserializer.take_message() {
                            self.handle_message(message)?;
                        }
                    }
                },

                SessionState::Closed => return Err(ServerSessionError::SessionClosed),
            }
        }
    }

    fn handle_message(&mut self, message: Message) -> Result<(), ServerSessionError> {
        trace!(
            "Received message type {} on stream {} ({} bytes, timestamp {})",
            message.message_type,
            message.stream_id,
            message.payload.len(),
            message.timestamp
        );

        if let Some(sequence_number) = self.ack_window.record(self.total_bytes_received) {
            self.send_packet(Acknowledgement { sequence_number }, 0)?;
        }

        match message.message_type {
            message_type::AMF0_COMMAND | message_type::AMF3_COMMAND => self.handle_command(message),
            message_type::AMF0_DATA | message_type::AMF3_DATA => self.handle_data(message),
            message_type::AUDIO | message_type::VIDEO => {
                self.handler.on_media(message).map_err(ServerSessionError::Handler)
            }

            message_type::AGGREGATE => self.handle_aggregate(&message),
            message_type::SET_CHUNK_SIZE => self.handle_set_chunk_size(&message),
            message_type::ABORT => {
                let packet = Abort::decode(&message.payload)?;
                self.deserializer.abort(packet.chunk_stream_id);
                Ok(())
            }

            message_type::WINDOW_ACK_SIZE => {
                let packet = SetWindowAckSize::decode(&message.payload)?;
                self.ack_window.set_window_ack_size(packet.ack_window_size);
                Ok(())
            }

            message_type::USER_CONTROL => self.handle_user_control(&message),
            message_type::ACKNOWLEDGEMENT => {
                trace!("Ignoring acknowledgement from client");
                Ok(())
            }

            other => {
                trace!("Ignoring message of type {}", other);
                Ok(())
            }
        }
    }

    fn handle_set_chunk_size(&mut self, message: &Message) -> Result<(), ServerSessionError> {
        let packet = SetChunkSize::decode(&message.payload)?;
        self.deserializer.set_max_chunk_size(packet.chunk_size as usize)?;
        debug!("Client chunk size changed to {}", packet.chunk_size);
        Ok(())
    }

    fn handle_user_control(&mut self, message: &Message) -> Result<(), ServerSessionError> {
        let packet = match UserControl::decode(&message.payload) {
            Ok(packet) => packet,
            Err(MessageDeserializationError::UnknownUserControlEvent { event_id }) => {
                trace!("Ignoring unknown user control event {}", event_id);
                return Ok(());
            }

            Err(error) => return Err(error.into()),
        };

        match packet.event {
            UserControlEvent::SetBufferLength { buffer_length, .. } => {
                debug!("Client buffer length set to {}ms", buffer_length);
                self.player_buffer_length = buffer_length;
            }

            UserControlEvent::PingRequest { timestamp } => {
                self.send_packet(UserControl::new(UserControlEvent::PingResponse { timestamp }), 0)?;
            }

            event => trace!("Ignoring user control event {:?}", event),
        }

        Ok(())
    }

    fn handle_aggregate(&mut self, message: &Message) -> Result<(), ServerSessionError> {
        for sub_message in AggregateSplitter::new(message) {
            self.handler.on_media(sub_message?).map_err(ServerSessionError::Handler)?;
        }

        Ok(())
    }

    fn handle_data(&mut self, message: Message) -> Result<(), ServerSessionError> {
        let payload = message.amf0_payload();
        let name = read_command_name(payload)?;

        match name.as_str() {
            SET_DATA_FRAME | ON_META_DATA => {
                let metadata = OnMetaData::decode(payload)?;
                debug!("Received metadata with {} properties", metadata.metadata.len());
                self.handler.on_metadata(&metadata).map_err(ServerSessionError::Handler)
            }

            _ => {
                trace!("Ignoring data message '{}'", name);
                Ok(())
            }
        }
    }

    fn handle_command(&mut self, message: Message) -> Result<(), ServerSessionError> {
        let payload = message.amf0_payload();
        let name = read_command_name(payload)?;
        debug!("Received '{}' command on stream {}", name, message.stream_id);

        match name.as_str() {
            CONNECT => self.handle_connect(payload),
            CREATE_STREAM => {
                let packet = CreateStream::decode(payload)?;
                let response = CreateStreamResponse {
                    transaction_id: packet.transaction_id,
                    stream_id: self.config.stream_id as f64,
                };

                self.send_packet(response, 0)
            }

            PUBLISH => {
                let packet = Publish::decode(payload)?;
                self.warn_on_unexpected_stream_id(&message);
                self.request.set_stream(&packet.stream_name);

                let decision = self.handler.on_publish(&self.request);
                self.apply_decision(decision, Self::accept_or_refuse_publish)
            }

            PLAY => {
                let packet = Play::decode(payload)?;
                self.warn_on_unexpected_stream_id(&message);
                self.request.set_stream(&packet.stream_name);

                let decision = self.handler.on_play(&self.request);
                self.apply_decision(decision, Self::accept_or_refuse_play)
            }

            RELEASE_STREAM | FC_PUBLISH => {
                let packet = FmleStart::decode(payload)?;
                self.send_packet(
                    FmleStartResponse {
                        transaction_id: packet.transaction_id,
                    },
                    0,
                )
            }

            FC_UNPUBLISH => {
                let packet = FmleStart::decode(payload)?;

                let mut data = Amf0Object::with_capacity(2);
                data.insert("code", status::UNPUBLISH_SUCCESS);
                data.insert("description", "Stop publishing stream.");

                let mut notification = OnStatusCall::new(data);
                notification.command_name = ON_FC_UNPUBLISH.to_string();
                self.send_packet(notification, 0)?;
                self.send_packet(
                    FmleStartResponse {
                        transaction_id: packet.transaction_id,
                    },
                    0,
                )?;

                self.finish_publishing();
                Ok(())
            }

            CLOSE_STREAM => {
                CloseStream::decode(payload)?;

                let mut data = status_object(
                    status::LEVEL_STATUS,
                    status::UNPUBLISH_SUCCESS,
                    "Stream is now unpublished",
                );
                data.insert("clientid", self.config.client_id.as_str());

                self.send_packet(OnStatusCall::new(data), self.config.stream_id)?;
                self.finish_publishing();
                Ok(())
            }

            DELETE_STREAM => {
                DeleteStream::decode(payload)?;
                self.finish_publishing();
                Ok(())
            }

            _ => {
                self.handler.on_unhandled_command(&name, &message);
                Ok(())
            }
        }
    }

    fn handle_connect(&mut self, payload: &[u8]) -> Result<(), ServerSessionError> {
        let packet = ConnectApp::decode(payload)?;

        self.request.set_tc_url(packet.tc_url());
        self.request.page_url = packet.page_url().unwrap_or_default().to_string();
        self.request.swf_url = packet.swf_url().unwrap_or_default().to_string();
        self.object_encoding = packet.object_encoding();
        self.connect_packet = Some(Arc::new(packet));

        debug!("Client connecting to {}", self.request.tc_url);
        let decision = self.handler.on_connect(&self.request);
        self.apply_decision(decision, Self::accept_or_refuse_connect)
    }

    fn apply_decision(
        &mut self,
        decision: Decision,
        respond: fn(&mut Self, bool) -> Result<(), ServerSessionError>,
    ) -> Result<(), ServerSessionError> {
        match decision {
            Decision::Accept => respond(self, true),
            Decision::Reject => respond(self, false),
            Decision::Defer => Ok(()),
        }
    }

    fn warn_on_unexpected_stream_id(&self, message: &Message) {
        if message.stream_id != self.config.stream_id {
            warn!(
                "Expected commands on stream id {} but received one on {}",
                self.config.stream_id, message.stream_id
            );
        }
    }

    fn finish_publishing(&mut self) {
        if self.publishing {
            self.publishing = false;
            self.handler.on_unpublish(&self.request);
        }
    }

    fn accept_or_refuse_connect(&mut self, allow: bool) -> Result<(), ServerSessionError> {
        let transaction_id = self
            .connect_packet
            .as_ref()
            .map_or(1.0, |packet| packet.transaction_id);

        if !allow {
            let error = OnError {
                transaction_id,
                data: status_object(status::LEVEL_ERROR, status::CONNECT_REJECTED, "connect refused"),
            };

            self.send_packet(error, 0)?;
            warn!("Refused connect request for tcUrl {}", self.request.tc_url);
            return Err(ServerSessionError::ConnectRefused);
        }

        self.send_packet(
            SetWindowAckSize {
                ack_window_size: self.config.window_ack_size,
            },
            0,
        )?;

        let mut properties = Amf0Object::with_capacity(3);
        properties.insert("fmsVer", self.config.fms_version.as_str());
        properties.insert("capabilities", self.config.capabilities);
        properties.insert("mode", self.config.mode);

        let mut information = status_object(status::LEVEL_STATUS, status::CONNECT_SUCCESS, "Connection succeeded");
        information.insert("objectEncoding", self.object_encoding);

        self.send_packet(
            ConnectAppResponse {
                transaction_id,
                properties,
                information,
            },
            0,
        )?;

        debug!("Accepted connect request for tcUrl {}", self.request.tc_url);
        Ok(())
    }

    fn accept_or_refuse_publish(&mut self, allow: bool) -> Result<(), ServerSessionError> {
        if !allow {
            warn!("Refused publish request for {}", self.request.stream_url());
            return Err(ServerSessionError::PublishRefused);
        }

        self.negotiate_out_chunk_size()?;

        let stream_id = self.config.stream_id;
        let mut data = Amf0Object::with_capacity(2);
        data.insert("code", status::PUBLISH_START);
        data.insert("description", "Started publishing stream.");

        let mut notification = OnStatusCall::new(data);
        notification.command_name = ON_FC_PUBLISH.to_string();
        self.send_packet(notification, stream_id)?;

        let mut data = status_object(status::LEVEL_STATUS, status::PUBLISH_START, "Started publishing stream.");
        data.insert("clientid", self.config.client_id.as_str());
        self.send_packet(OnStatusCall::new(data), stream_id)?;

        self.publishing = true;
        debug!("Accepted publish request for {}", self.request.stream_url());
        Ok(())
    }

    fn accept_or_refuse_play(&mut self, allow: bool) -> Result<(), ServerSessionError> {
        if !allow {
            warn!("Refused play request for {}", self.request.stream_url());
            return Err(ServerSessionError::PlayRefused);
        }

        self.negotiate_out_chunk_size()?;

        let stream_id = self.config.stream_id;
        self.send_packet(UserControl::new(UserControlEvent::StreamBegin { stream_id }), 0)?;

        let mut reset = status_object(status::LEVEL_STATUS, status::PLAY_RESET, "Playing and resetting stream.");
        reset.insert("details", "stream");
        reset.insert("clientid", self.config.client_id.as_str());
        self.send_packet(OnStatusCall::new(reset), stream_id)?;

        let mut start = status_object(status::LEVEL_STATUS, status::PLAY_START, "Started playing stream.");
        start.insert("details", "stream");
        start.insert("clientid", self.config.client_id.as_str());
        self.send_packet(OnStatusCall::new(start), stream_id)?;

        let sample_access = SampleAccess {
            video_sample_access: true,
            audio_sample_access: true,
        };
        self.send_packet(sample_access, stream_id)?;

        let mut data_start = Amf0Object::with_capacity(1);
        data_start.insert("code", status::DATA_START);
        self.send_packet(OnStatusData { data: data_start }, stream_id)?;

        let description = format!("{} is now published.", self.request.stream);
        let mut notify = status_object(status::LEVEL_STATUS, status::PLAY_PUBLISH_NOTIFY, &description);
        notify.insert("details", self.request.stream.as_str());
        notify.insert("clientid", self.config.client_id.as_str());
        self.send_packet(OnStatusCall::new(notify), stream_id)?;

        debug!("Accepted play request for {}", self.request.stream_url());
        self.handler.on_play_start(&self.request);
        Ok(())
    }

    /// Tells the client about the new outbound chunk size, then starts using it
    fn negotiate_out_chunk_size(&mut self) -> Result<(), ServerSessionError> {
        let chunk_size = self.out_chunk_size;
        self.send_packet(SetChunkSize { chunk_size }, 0)?;
        self.serializer.set_max_chunk_size(chunk_size as usize)?;
        debug!("Outbound chunk size changed to {}", chunk_size);
        Ok(())
    }

    fn send_packet(&mut self, packet: impl Into<Packet>, stream_id: u32) -> Result<(), ServerSessionError> {
        let message = packet.into().into_message(0, stream_id)?;
        self.send_message(&message)
    }

    fn send_message(&mut self, message: &Message) -> Result<(), ServerSessionError> {
        let bytes = self.serializer.serialize(message)?;
        self.transport.write_all(&bytes)?;
        trace!(
            "Sent message type {} on csid {} ({} bytes)",
            message.message_type,
            message.preferred_chunk_stream_id,
            bytes.len()
        );

        Ok(())
    }
}
