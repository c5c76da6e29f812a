/// The configuration options that govern how a RTMP server session should operate
#[derive(Clone, Debug)]
pub struct ServerSessionConfig {
    /// Reported as `fmsVer` in the connect response
    pub fms_version: String,

    /// Reported as `clientid` in status notifications
    pub client_id: String,

    /// Acknowledgement window advertised to the client when its connection is accepted
    pub window_ack_size: u32,

    /// How many bytes may be received before an acknowledgement is sent, until the client
    /// announces its own window
    pub receive_ack_window: u32,

    /// Chunk size negotiated with the client once a publish or play request is accepted
    pub out_chunk_size: u32,

    /// The single message stream id `createStream` hands out
    pub stream_id: u32,

    /// Assumed player buffer length in milliseconds, until the client sets one
    pub player_buffer_length: u32,

    pub capabilities: f64,
    pub mode: f64,
}

impl ServerSessionConfig {
    /// Creates a new server session config with overridable defaults
    pub fn new() -> ServerSessionConfig {
        ServerSessionConfig {
            fms_version: "FMS/3,5,3,888".to_string(),
            client_id: "ASAICiss".to_string(),
            window_ack_size: 2_500_000,
            receive_ack_window: 2_500_000,
            out_chunk_size: 60_000,
            stream_id: 1,
            player_buffer_length: 3000,
            capabilities: 127.0,
            mode: 1.0,
        }
    }
}

impl Default for ServerSessionConfig {
    fn default() -> Self {
        ServerSessionConfig::new()
    }
}
