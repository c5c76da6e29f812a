use lms_rtmp::messages::{Message, OnMetaData};

/// What a late joining player needs to start decoding a stream that is already live
pub struct PublishDetails {
    pub video_sequence_header: Option<Message>,
    pub audio_sequence_header: Option<Message>,
    pub metadata: Option<OnMetaData>,
    pub connection_id: i32,
}

impl PublishDetails {
    pub fn new(connection_id: i32) -> Self {
        PublishDetails {
            video_sequence_header: None,
            audio_sequence_header: None,
            metadata: None,
            connection_id,
        }
    }
}
