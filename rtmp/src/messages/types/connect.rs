use bytes::Bytes;
use lms_amf0::{Amf0Object, Amf0Value};

use super::command::{encode_values, CommandValues};
use crate::messages::{MessageDeserializationError, MessageSerializationError};

pub const CONNECT: &str = "connect";
pub const RESULT: &str = "_result";

/// The `connect` command a client opens every session with
#[derive(PartialEq, Debug, Clone)]
pub struct ConnectApp {
    pub transaction_id: f64,

    /// Connection properties such as `app`, `tcUrl`, `pageUrl` and `objectEncoding`
    pub command_object: Amf0Object,

    /// Optional user arguments following the command object
    pub arguments: Option<Amf0Object>,
}

impl ConnectApp {
    /// A connect request for the given tcUrl, as a client would send it
    pub fn new(tc_url: &str) -> Self {
        let mut command_object = Amf0Object::new();
        command_object.insert("tcUrl", tc_url);

        ConnectApp {
            transaction_id: 1.0,
            command_object,
            arguments: None,
        }
    }

    pub fn tc_url(&self) -> &str {
        self.command_object.get_str("tcUrl").unwrap_or_default()
    }

    pub fn page_url(&self) -> Option<&str> {
        self.command_object.get_str("pageUrl")
    }

    pub fn swf_url(&self) -> Option<&str> {
        self.command_object.get_str("swfUrl")
    }

    /// 0 for AMF0 and 3 for AMF3.  Clients that don't say are treated as AMF0.
    pub fn object_encoding(&self) -> f64 {
        self.command_object.get_number("objectEncoding").unwrap_or(0.0)
    }

    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        let mut values = vec![
            Amf0Value::Utf8String(CONNECT.to_string()),
            Amf0Value::Number(self.transaction_id),
            Amf0Value::Object(self.command_object.clone()),
        ];

        if let Some(arguments) = &self.arguments {
            values.push(Amf0Value::Object(arguments.clone()));
        }

        encode_values(&values)
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        values.expect_name(CONNECT)?;

        let transaction_id = values.number("transaction id")?;
        let command_object = values.object("command object")?;
        if command_object.get_str("tcUrl").is_none() {
            return Err(MessageDeserializationError::InvalidField { field: "tcUrl" });
        }

        Ok(ConnectApp {
            transaction_id,
            command_object,
            arguments: values.optional_object(),
        })
    }
}

/// The `_result` answering an accepted `connect`
#[derive(PartialEq, Debug, Clone)]
pub struct ConnectAppResponse {
    pub transaction_id: f64,

    /// Server properties such as `fmsVer`, `capabilities` and `mode`
    pub properties: Amf0Object,

    /// Status information with `level`, `code`, `description` and `objectEncoding`
    pub information: Amf0Object,
}

impl ConnectAppResponse {
    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(RESULT.to_string()),
            Amf0Value::Number(self.transaction_id),
            Amf0Value::Object(self.properties.clone()),
            Amf0Value::Object(self.information.clone()),
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        values.expect_name(RESULT)?;

        Ok(ConnectAppResponse {
            transaction_id: values.number("transaction id")?,
            properties: values.object("properties")?,
            information: values.object("information")?,
        })
    }
}
