use crate::send;
use crate::stream_manager::{ConnectionMessage, StreamManagerMessage};
use bytes::BytesMut;
use lms_rtmp::messages::{Message, OnMetaData};
use lms_rtmp::sessions::{
    Decision, HandlerError, Request, ServerSession, ServerSessionConfig, ServerSessionHandler,
};
use std::error::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

type ConnectionSession = ServerSession<Vec<u8>, ConnectionHandler>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum PendingRequest {
    Publish,
    Play,
}

/// Forwards session events to the stream manager.  Publish and play requests are deferred
/// until the stream manager answers them.
struct ConnectionHandler {
    id: i32,
    manager: UnboundedSender<StreamManagerMessage>,
    pending: Option<PendingRequest>,
}

impl ConnectionHandler {
    fn request(&mut self, kind: PendingRequest, message: StreamManagerMessage) -> Decision {
        if !send(&self.manager, message) {
            return Decision::Reject;
        }

        self.pending = Some(kind);
        Decision::Defer
    }

    fn forward(&self, message: StreamManagerMessage) -> Result<(), HandlerError> {
        if send(&self.manager, message) {
            Ok(())
        } else {
            Err("The stream manager has shut down".into())
        }
    }
}

impl ServerSessionHandler for ConnectionHandler {
    fn on_connect(&mut self, request: &Request) -> Decision {
        info!("Connection {}: Client requested connection to app '{}'", self.id, request.app);
        Decision::Accept
    }

    fn on_publish(&mut self, request: &Request) -> Decision {
        let message = StreamManagerMessage::PublishRequest {
            connection_id: self.id,
            stream_key: request.stream_url(),
        };

        self.request(PendingRequest::Publish, message)
    }

    fn on_play(&mut self, request: &Request) -> Decision {
        let message = StreamManagerMessage::PlaybackRequest {
            connection_id: self.id,
            stream_key: request.stream_url(),
        };

        self.request(PendingRequest::Play, message)
    }

    fn on_unpublish(&mut self, _request: &Request) {
        send(&self.manager, StreamManagerMessage::PublishFinished { connection_id: self.id });
    }

    fn on_metadata(&mut self, metadata: &OnMetaData) -> Result<(), HandlerError> {
        self.forward(StreamManagerMessage::UpdatedStreamMetadata {
            sending_connection_id: self.id,
            metadata: metadata.clone(),
        })
    }

    fn on_media(&mut self, message: Message) -> Result<(), HandlerError> {
        self.forward(StreamManagerMessage::NewMedia {
            sending_connection_id: self.id,
            message,
        })
    }

    fn on_unhandled_command(&mut self, name: &str, _message: &Message) {
        debug!("Connection {}: Ignoring '{}' command", self.id, name);
    }
}

pub struct Connection {
    id: i32,
    manager: UnboundedSender<StreamManagerMessage>,
    chunk_size: u32,
}

impl Connection {
    pub fn new(id: i32, manager: UnboundedSender<StreamManagerMessage>, chunk_size: u32) -> Self {
        Connection { id, manager, chunk_size }
    }

    pub async fn run(self, stream: TcpStream) -> Result<(), Box<dyn Error + Sync + Send>> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let registration = StreamManagerMessage::NewConnection {
            connection_id: self.id,
            sender,
        };

        if !send(&self.manager, registration) {
            return Err("The stream manager has shut down".into());
        }

        let result = self.process(stream, receiver).await;
        send(&self.manager, StreamManagerMessage::ConnectionClosed { connection_id: self.id });
        info!("Connection {}: Client disconnected", self.id);

        result
    }

    async fn process(
        &self,
        mut stream: TcpStream,
        mut receiver: mpsc::UnboundedReceiver<ConnectionMessage>,
    ) -> Result<(), Box<dyn Error + Sync + Send>> {
        let mut config = ServerSessionConfig::new();
        config.out_chunk_size = self.chunk_size;

        let handler = ConnectionHandler {
            id: self.id,
            manager: self.manager.clone(),
            pending: None,
        };

        let mut session = ServerSession::new(config, Vec::new(), handler);
        let mut buffer = BytesMut::with_capacity(4096);
        let mut has_received_keyframe = false;

        loop {
            tokio::select! {
                bytes_read = stream.read_buf(&mut buffer) => {
                    if bytes_read? == 0 {
                        return Ok(());
                    }

                    session.handle_input(&buffer.split())?;
                }

                message = receiver.recv() => {
                    let message = match message {
                        Some(x) => x,
                        None => return Ok(()),
                    };

                    match message {
                        ConnectionMessage::RequestAccepted => respond(&mut session, self.id, true)?,
                        ConnectionMessage::RequestDenied => respond(&mut session, self.id, false)?,
                        ConnectionMessage::NewMetadata { metadata } => session.send_metadata(&metadata)?,
                        ConnectionMessage::NewMedia { message, can_be_dropped } => {
                            // Players that joined mid stream can't decode anything before a keyframe
                            if message.is_video() && !can_be_dropped {
                                has_received_keyframe = true;
                            }

                            if has_received_keyframe || !message.is_video() {
                                session.send_av_data(message)?;
                            }
                        }
                    }
                }
            }

            let output = std::mem::take(session.transport_mut());
            if !output.is_empty() {
                stream.write_all(&output).await?;
            }
        }
    }
}

fn respond(session: &mut ConnectionSession, id: i32, allow: bool) -> Result<(), Box<dyn Error + Sync + Send>> {
    match session.handler_mut().pending.take() {
        Some(PendingRequest::Publish) => session.respond_publish(allow)?,
        Some(PendingRequest::Play) => session.respond_play(allow)?,
        None => warn!("Connection {}: Received an answer to a request that was never made", id),
    }

    Ok(())
}
