use super::ConnectionMessage;
use lms_rtmp::messages::{Message, OnMetaData};
use tokio::sync::mpsc;

/// What connections tell the stream manager.  Streams are keyed by `app/stream`.
#[derive(Debug)]
pub enum StreamManagerMessage {
    NewConnection {
        connection_id: i32,
        sender: mpsc::UnboundedSender<ConnectionMessage>,
    },

    PublishRequest {
        connection_id: i32,
        stream_key: String,
    },

    PlaybackRequest {
        connection_id: i32,
        stream_key: String,
    },

    UpdatedStreamMetadata {
        sending_connection_id: i32,
        metadata: OnMetaData,
    },

    NewMedia {
        sending_connection_id: i32,
        message: Message,
    },

    PublishFinished {
        connection_id: i32,
    },

    ConnectionClosed {
        connection_id: i32,
    },
}
