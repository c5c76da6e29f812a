use tracing::warn;
use url::Url;

pub const DEFAULT_PORT: u16 = 1935;

/// What a client asked for: where it connected and which stream it wants to publish or play.
///
/// Filled in from the `connect` command, then from `publish` or `play`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub tc_url: String,
    pub page_url: String,
    pub swf_url: String,

    pub schema: String,
    pub host: String,
    pub port: u16,
    pub app: String,

    /// Stream name with any query string removed
    pub stream: String,

    /// Query string of the stream name, or of the tcUrl when the stream name has none
    pub params: String,
}

impl Request {
    pub fn new() -> Self {
        Request {
            tc_url: String::new(),
            page_url: String::new(),
            swf_url: String::new(),
            schema: String::new(),
            host: String::new(),
            port: DEFAULT_PORT,
            app: String::new(),
            stream: String::new(),
            params: String::new(),
        }
    }

    /// Stores the tcUrl and splits it into schema, host, port and app.  A tcUrl that can't
    /// be parsed is kept as is with the derived fields left empty.
    pub fn set_tc_url(&mut self, tc_url: &str) {
        self.tc_url = tc_url.to_string();

        let url = match Url::parse(tc_url) {
            Ok(url) => url,
            Err(error) => {
                warn!("Could not parse tcUrl '{}': {}", tc_url, error);
                return;
            }
        };

        self.schema = url.scheme().to_string();
        self.host = url.host_str().unwrap_or_default().to_string();
        self.port = url.port().unwrap_or(DEFAULT_PORT);
        self.app = url.path().trim_matches('/').to_string();
        self.params = url.query().unwrap_or_default().to_string();
    }

    /// Stores the stream name, moving anything after a `?` into `params`
    pub fn set_stream(&mut self, stream: &str) {
        match stream.find('?') {
            Some(index) => {
                self.stream = stream[..index].to_string();
                self.params = stream[index + 1..].to_string();
            }

            None => self.stream = stream.to_string(),
        }
    }

    /// `app/stream`, the key most servers index streams by
    pub fn stream_url(&self) -> String {
        format!("{}/{}", self.app, self.stream)
    }
}

impl Default for Request {
    fn default() -> Self {
        Request::new()
    }
}
