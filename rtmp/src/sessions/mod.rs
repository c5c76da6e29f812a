//! Sessions react to RTMP chunks coming in from a peer, answer with chunks of their own and
//! raise the events applications perform custom logic on.

mod server;

pub use self::server::Decision;
pub use self::server::HandlerError;
pub use self::server::Request;
pub use self::server::ServerSession;
pub use self::server::ServerSessionConfig;
pub use self::server::ServerSessionError;
pub use self::server::ServerSessionErrorKind;
pub use self::server::ServerSessionHandler;
pub use self::server::SessionState;
