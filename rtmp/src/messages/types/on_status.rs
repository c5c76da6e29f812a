use bytes::Bytes;
use lms_amf0::{Amf0Object, Amf0Value};

use super::command::{encode_values, CommandValues};
use crate::messages::{MessageDeserializationError, MessageSerializationError};

pub const ON_STATUS: &str = "onStatus";
pub const ON_FC_PUBLISH: &str = "onFCPublish";
pub const ON_FC_UNPUBLISH: &str = "onFCUnpublish";
pub const ERROR: &str = "_error";

/// A status notification sent as a command message (`onStatus`, `onFCPublish` or
/// `onFCUnpublish`)
#[derive(PartialEq, Debug, Clone)]
pub struct OnStatusCall {
    pub command_name: String,
    pub transaction_id: f64,
    pub data: Amf0Object,
}

impl OnStatusCall {
    pub fn new(data: Amf0Object) -> Self {
        OnStatusCall {
            command_name: ON_STATUS.to_string(),
            transaction_id: 0.0,
            data,
        }
    }

    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(self.command_name.clone()),
            Amf0Value::Number(self.transaction_id),
            Amf0Value::Null,
            Amf0Value::Object(self.data.clone()),
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        let command_name = values.expect_name_in(&[ON_STATUS, ON_FC_PUBLISH, ON_FC_UNPUBLISH])?;
        let transaction_id = values.number("transaction id")?;
        values.skip();

        Ok(OnStatusCall {
            command_name,
            transaction_id,
            data: values.object("status object")?,
        })
    }
}

/// A status notification sent as a data message, without transaction id or command object
#[derive(PartialEq, Debug, Clone)]
pub struct OnStatusData {
    pub data: Amf0Object,
}

impl OnStatusData {
    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(ON_STATUS.to_string()),
            Amf0Value::Object(self.data.clone()),
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        values.expect_name(ON_STATUS)?;

        Ok(OnStatusData {
            data: values.object("status object")?,
        })
    }
}

/// The `_error` answer to a command
#[derive(PartialEq, Debug, Clone)]
pub struct OnError {
    pub transaction_id: f64,
    pub data: Amf0Object,
}

impl OnError {
    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(ERROR.to_string()),
            Amf0Value::Number(self.transaction_id),
            Amf0Value::Null,
            Amf0Value::Object(self.data.clone()),
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        values.expect_name(ERROR)?;

        let transaction_id = values.number("transaction id")?;
        values.skip();

        Ok(OnError {
            transaction_id,
            data: values.object("error object")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::types::command::status_object;

    #[test]
    fn can_round_trip_on_status_call() {
        let mut data = status_object("status", "NetStream.Publish.Start", "Started publishing stream.");
        data.insert("clientid", "ASAICiss");

        let packet = OnStatusCall::new(data);
        let decoded = OnStatusCall::decode(&packet.encode().unwrap()).unwrap();

        assert_eq!(decoded, packet);
        assert_eq!(decoded.data.get_str("code"), Some("NetStream.Publish.Start"));
    }

    #[test]
    fn can_round_trip_on_fc_publish() {
        let mut packet = OnStatusCall::new(status_object("status", "NetStream.Publish.Start", "x"));
        packet.command_name = ON_FC_PUBLISH.to_string();

        assert_eq!(OnStatusCall::decode(&packet.encode().unwrap()).unwrap(), packet);
    }

    #[test]
    fn on_status_data_has_no_transaction_id() {
        let packet = OnStatusData {
            data: status_object("status", "NetStream.Data.Start", ""),
        };

        let bytes = packet.encode().unwrap();
        let raw = lms_amf0::deserialize(&mut &bytes[..]).unwrap();

        assert_eq!(raw.len(), 2);
        assert_eq!(OnStatusData::decode(&bytes).unwrap(), packet);
    }

    #[test]
    fn can_round_trip_error() {
        let packet = OnError {
            transaction_id: 1.0,
            data: status_object("error", "NetConnection.Connect.Rejected", "connect refused"),
        };

        assert_eq!(OnError::decode(&packet.encode().unwrap()).unwrap(), packet);
    }
}
