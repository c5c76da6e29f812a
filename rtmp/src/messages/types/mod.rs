mod abort;
mod acknowledgement;
pub(crate) mod command;
mod connect;
mod data;
mod fmle_start;
mod on_status;
mod play;
mod publish;
mod set_chunk_size;
mod stream_lifecycle;
mod user_control;
mod window_acknowledgement_size;

pub use self::abort::Abort;
pub use self::acknowledgement::Acknowledgement;
pub use self::command::{read_command_name, status_object};
pub use self::connect::{ConnectApp, ConnectAppResponse};
pub use self::data::{OnMetaData, SampleAccess};
pub use self::fmle_start::{FmleStart, FmleStartResponse};
pub use self::on_status::{OnError, OnStatusCall, OnStatusData};
pub use self::play::Play;
pub use self::publish::Publish;
pub use self::set_chunk_size::SetChunkSize;
pub use self::stream_lifecycle::{CloseStream, CreateStream, CreateStreamResponse, DeleteStream};
pub use self::user_control::{UserControl, UserControlEvent};
pub use self::window_acknowledgement_size::SetWindowAckSize;

/// Names of the command and data messages that are understood
pub mod names {
    pub use super::connect::{CONNECT, RESULT};
    pub use super::data::{ON_META_DATA, SAMPLE_ACCESS, SET_DATA_FRAME};
    pub use super::fmle_start::{FC_PUBLISH, FC_UNPUBLISH, RELEASE_STREAM};
    pub use super::on_status::{ERROR, ON_FC_PUBLISH, ON_FC_UNPUBLISH, ON_STATUS};
    pub use super::play::PLAY;
    pub use super::publish::PUBLISH;
    pub use super::stream_lifecycle::{CLOSE_STREAM, CREATE_STREAM, DELETE_STREAM};
}
