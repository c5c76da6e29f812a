use bytes::Bytes;
use lms_amf0::Amf0Value;

use super::command::{encode_values, CommandValues};
use crate::messages::{MessageDeserializationError, MessageSerializationError};

pub const PUBLISH: &str = "publish";

/// Starts publishing on the stream name.  The type is `live`, `record` or `append`.
#[derive(PartialEq, Debug, Clone)]
pub struct Publish {
    pub transaction_id: f64,
    pub stream_name: String,
    pub publish_type: String,
}

impl Publish {
    pub fn new(stream_name: &str) -> Self {
        Publish {
            transaction_id: 0.0,
            stream_name: stream_name.to_string(),
            publish_type: "live".to_string(),
        }
    }

    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(PUBLISH.to_string()),
            Amf0Value::Number(self.transaction_id),
            Amf0Value::Null,
            Amf0Value::Utf8String(self.stream_name.clone()),
            Amf0Value::Utf8String(self.publish_type.clone()),
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        values.expect_name(PUBLISH)?;

        let transaction_id = values.number("transaction id")?;
        values.skip();
        let stream_name = values.string("stream name")?;
        let publish_type = values.optional_string().unwrap_or_else(|| "live".to_string());

        Ok(Publish {
            transaction_id,
            stream_name,
            publish_type,
        })
    }
}
