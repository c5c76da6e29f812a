//! Levels and codes carried in `onStatus`, `_result` and `_error` information objects.

pub const LEVEL_STATUS: &str = "status";
pub const LEVEL_ERROR: &str = "error";

pub const CONNECT_SUCCESS: &str = "NetConnection.Connect.Success";
pub const CONNECT_REJECTED: &str = "NetConnection.Connect.Rejected";

pub const PUBLISH_START: &str = "NetStream.Publish.Start";
pub const UNPUBLISH_SUCCESS: &str = "NetStream.Unpublish.Success";

pub const PLAY_RESET: &str = "NetStream.Play.Reset";
pub const PLAY_START: &str = "NetStream.Play.Start";
pub const PLAY_PUBLISH_NOTIFY: &str = "NetStream.Play.PublishNotify";
pub const DATA_START: &str = "NetStream.Data.Start";
