use super::errors::HandlerError;
use super::request::Request;
use crate::messages::{Message, OnMetaData};

/// How the session should answer a connect, publish or play request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Respond with success right away
    Accept,

    /// Refuse right away, which closes the session
    Reject,

    /// Do nothing now.  The application calls the matching `respond_*` method itself later.
    Defer,
}

/// Receives the events a `ServerSession` raises while reading from its client.
///
/// Every method has a default, so implementations only override what they care about.  The
/// defaults defer every request and ignore all media.
pub trait ServerSessionHandler {
    /// A `connect` command arrived.  `request` holds the tcUrl and its parts.
    fn on_connect(&mut self, _request: &Request) -> Decision {
        Decision::Defer
    }

    /// A `publish` command arrived.  `request.stream` holds the stream name.
    fn on_publish(&mut self, _request: &Request) -> Decision {
        Decision::Defer
    }

    /// A `play` command arrived.  `request.stream` holds the stream name.
    fn on_play(&mut self, _request: &Request) -> Decision {
        Decision::Defer
    }

    /// The play response sequence was sent and media may now be sent to the client
    fn on_play_start(&mut self, _request: &Request) {}

    /// The publisher stopped publishing, through `FCUnpublish`, `closeStream` or `deleteStream`
    fn on_unpublish(&mut self, _request: &Request) {}

    fn on_metadata(&mut self, _metadata: &OnMetaData) -> Result<(), HandlerError> {
        Ok(())
    }

    /// An audio or video message from the publisher, including those split out of aggregates
    fn on_media(&mut self, _message: Message) -> Result<(), HandlerError> {
        Ok(())
    }

    /// A command with a name the session has no built in handling for
    fn on_unhandled_command(&mut self, _name: &str, _message: &Message) {}
}
