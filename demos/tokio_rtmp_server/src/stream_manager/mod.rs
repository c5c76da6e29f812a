mod connection_message;
mod publish_details;
mod stream_manager_message;

use crate::{send, spawn};
use bytes::Bytes;
use lms_rtmp::messages::Message;
use std::collections::hash_map::HashMap;
use std::collections::hash_set::HashSet;
use std::error::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

pub use connection_message::ConnectionMessage;
pub use publish_details::PublishDetails;
pub use stream_manager_message::StreamManagerMessage;

pub fn start() -> mpsc::UnboundedSender<StreamManagerMessage> {
    let (sender, receiver) = mpsc::unbounded_channel();

    let manager = StreamManager::new();
    spawn(manager.run(receiver));

    sender
}

struct StreamManager {
    players_by_key: HashMap<String, HashSet<i32>>,
    publish_details: HashMap<String, PublishDetails>,
    sender_by_connection_id: HashMap<i32, mpsc::UnboundedSender<ConnectionMessage>>,
    key_by_connection_id: HashMap<i32, String>,
}

impl StreamManager {
    fn new() -> Self {
        StreamManager {
            publish_details: HashMap::new(),
            players_by_key: HashMap::new(),
            sender_by_connection_id: HashMap::new(),
            key_by_connection_id: HashMap::new(),
        }
    }

    fn cleanup_connection(&mut self, connection_id: i32) {
        debug!("Stream manager is removing connection id {}", connection_id);

        self.sender_by_connection_id.remove(&connection_id);
        if let Some(key) = self.key_by_connection_id.remove(&connection_id) {
            if let Some(players) = self.players_by_key.get_mut(&key) {
                players.remove(&connection_id);
            }

            let is_publisher = self
                .publish_details
                .get(&key)
                .map_or(false, |details| details.connection_id == connection_id);

            if is_publisher {
                info!("Stream '{}' is no longer being published", key);
                self.publish_details.remove(&key);
            }
        }
    }

    /// Answers a request, forgetting the connection if it has gone away
    fn reply(&mut self, connection_id: i32, message: ConnectionMessage) -> bool {
        let delivered = match self.sender_by_connection_id.get(&connection_id) {
            Some(sender) => send(sender, message),
            None => {
                warn!("Connection {} sent a request without registering", connection_id);
                return false;
            }
        };

        if !delivered {
            self.cleanup_connection(connection_id);
        }

        delivered
    }

    async fn run(mut self, mut receiver: UnboundedReceiver<StreamManagerMessage>) -> Result<(), Box<dyn Error + Sync + Send>> {
        while let Some(message) = receiver.recv().await {
            match message {
                StreamManagerMessage::NewConnection { connection_id, sender } => {
                    self.sender_by_connection_id.insert(connection_id, sender);
                }

                StreamManagerMessage::PublishRequest {
                    connection_id,
                    stream_key,
                } => self.handle_publish_request(connection_id, stream_key),

                StreamManagerMessage::PlaybackRequest {
                    connection_id,
                    stream_key,
                } => self.handle_playback_request(connection_id, stream_key),

                StreamManagerMessage::PublishFinished { connection_id } => {
                    let key = match self.key_by_connection_id.remove(&connection_id) {
                        Some(x) => x,
                        None => continue,
                    };

                    info!("Stream '{}' is no longer being published", key);
                    self.publish_details.remove(&key);
                }

                StreamManagerMessage::ConnectionClosed { connection_id } => self.cleanup_connection(connection_id),

                StreamManagerMessage::NewMedia {
                    sending_connection_id,
                    message,
                } => self.handle_media(sending_connection_id, message),

                StreamManagerMessage::UpdatedStreamMetadata {
                    sending_connection_id,
                    metadata,
                } => {
                    let key = match self.key_by_connection_id.get(&sending_connection_id) {
                        Some(x) => x,
                        None => continue,
                    };

                    let details = match self.publish_details.get_mut(key) {
                        Some(x) => x,
                        None => continue,
                    };

                    debug!("New metadata published for stream '{}'", key);
                    details.metadata = Some(metadata.clone());

                    if let Some(players) = self.players_by_key.get(key.as_str()) {
                        for player_id in players {
                            if let Some(sender) = self.sender_by_connection_id.get(player_id) {
                                let message = ConnectionMessage::NewMetadata {
                                    metadata: metadata.clone(),
                                };

                                send(sender, message);
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_publish_request(&mut self, connection_id: i32, key: String) {
        if self.key_by_connection_id.contains_key(&connection_id) {
            warn!(
                "Connection {} is requesting to publish, but its already being tracked",
                connection_id
            );

            self.reply(connection_id, ConnectionMessage::RequestDenied);
            return;
        }

        if let Some(details) = self.publish_details.get(&key) {
            warn!(
                "Publish request by connection {} for stream '{}' rejected as it's already being published by connection {}",
                connection_id, key, details.connection_id
            );

            self.reply(connection_id, ConnectionMessage::RequestDenied);
            return;
        }

        self.key_by_connection_id.insert(connection_id, key.clone());
        self.publish_details.insert(key.clone(), PublishDetails::new(connection_id));

        if self.reply(connection_id, ConnectionMessage::RequestAccepted) {
            info!("Connection {} is publishing stream '{}'", connection_id, key);
        }
    }

    fn handle_playback_request(&mut self, connection_id: i32, key: String) {
        if self.key_by_connection_id.contains_key(&connection_id) {
            warn!(
                "Playback requested by connection {} but its already being tracked",
                connection_id
            );

            self.reply(connection_id, ConnectionMessage::RequestDenied);
            return;
        }

        self.players_by_key
            .entry(key.clone())
            .or_insert_with(HashSet::new)
            .insert(connection_id);

        self.key_by_connection_id.insert(connection_id, key.clone());

        if !self.reply(connection_id, ConnectionMessage::RequestAccepted) {
            return;
        }

        info!("Connection {} is playing stream '{}'", connection_id, key);

        // If someone is publishing on this stream already, send the latest metadata and
        // sequence headers so the player can start decoding right away
        let details = match self.publish_details.get(&key) {
            Some(x) => x,
            None => return,
        };

        let mut catch_up = Vec::new();
        if let Some(metadata) = &details.metadata {
            catch_up.push(ConnectionMessage::NewMetadata {
                metadata: metadata.clone(),
            });
        }

        for header in details.video_sequence_header.iter().chain(details.audio_sequence_header.iter()) {
            let mut message = header.clone();
            message.timestamp = 0;
            catch_up.push(ConnectionMessage::NewMedia {
                message,
                can_be_dropped: false,
            });
        }

        for message in catch_up {
            if !self.reply(connection_id, message) {
                return;
            }
        }
    }

    fn handle_media(&mut self, sending_connection_id: i32, message: Message) {
        let key = match self.key_by_connection_id.get(&sending_connection_id) {
            Some(x) => x,
            None => return,
        };

        let details = match self.publish_details.get_mut(key) {
            Some(x) if x.connection_id == sending_connection_id => x,
            _ => return,
        };

        let mut can_be_dropped = true;
        if message.is_video() {
            if is_video_sequence_header(&message.payload) {
                details.video_sequence_header = Some(message.clone());
                can_be_dropped = false;
            } else if is_video_keyframe(&message.payload) {
                can_be_dropped = false;
            }
        } else if is_audio_sequence_header(&message.payload) {
            details.audio_sequence_header = Some(message.clone());
            can_be_dropped = false;
        }

        if let Some(players) = self.players_by_key.get(key.as_str()) {
            for player_id in players {
                if let Some(sender) = self.sender_by_connection_id.get(player_id) {
                    let relayed = ConnectionMessage::NewMedia {
                        message: message.clone(),
                        can_be_dropped,
                    };

                    send(sender, relayed);
                }
            }
        }
    }
}

fn is_video_sequence_header(data: &Bytes) -> bool {
    // This is assuming h264.
    data.len() >= 2 && data[0] == 0x17 && data[1] == 0x00
}

fn is_audio_sequence_header(data: &Bytes) -> bool {
    // This is assuming aac
    data.len() >= 2 && data[0] == 0xaf && data[1] == 0x00
}

fn is_video_keyframe(data: &Bytes) -> bool {
    // assumings h264
    data.len() >= 2 && data[0] == 0x17 && data[1] != 0x00 // 0x00 is the sequence header, don't count that for now
}
