use lms_rtmp::messages::{Message, OnMetaData};

/// What the stream manager tells a connection
#[derive(Debug)]
pub enum ConnectionMessage {
    RequestAccepted,
    RequestDenied,

    NewMedia {
        message: Message,

        /// Players that joined mid stream may skip this until the next keyframe
        can_be_dropped: bool,
    },

    NewMetadata {
        metadata: OnMetaData,
    },
}
