use bytes::Bytes;
use lms_amf0::Amf0Value;

use super::command::{encode_values, CommandValues};
use super::connect::RESULT;
use crate::messages::{MessageDeserializationError, MessageSerializationError};

pub const RELEASE_STREAM: &str = "releaseStream";
pub const FC_PUBLISH: &str = "FCPublish";
pub const FC_UNPUBLISH: &str = "FCUnpublish";

/// The `releaseStream`, `FCPublish` and `FCUnpublish` commands encoders such as FMLE and OBS
/// send around a publish.  They all share one layout.
#[derive(PartialEq, Debug, Clone)]
pub struct FmleStart {
    pub command_name: String,
    pub transaction_id: f64,
    pub stream_name: String,
}

impl FmleStart {
    pub fn new(command_name: &str, transaction_id: f64, stream_name: &str) -> Self {
        FmleStart {
            command_name: command_name.to_string(),
            transaction_id,
            stream_name: stream_name.to_string(),
        }
    }

    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(self.command_name.clone()),
            Amf0Value::Number(self.transaction_id),
            Amf0Value::Null,
            Amf0Value::Utf8String(self.stream_name.clone()),
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        let command_name = values.expect_name_in(&[RELEASE_STREAM, FC_PUBLISH, FC_UNPUBLISH])?;
        let transaction_id = values.number("transaction id")?;
        values.skip();

        Ok(FmleStart {
            command_name,
            transaction_id,
            stream_name: values.optional_string().unwrap_or_default(),
        })
    }
}

/// The empty `_result` acknowledging an `FmleStart` command
#[derive(PartialEq, Debug, Clone)]
pub struct FmleStartResponse {
    pub transaction_id: f64,
}

impl FmleStartResponse {
    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(RESULT.to_string()),
            Amf0Value::Number(self.transaction_id),
            Amf0Value::Null,
            Amf0Value::Undefined,
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        values.expect_name(RESULT)?;

        Ok(FmleStartResponse {
            transaction_id: values.number("transaction id")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_round_trip_each_fmle_command() {
        for name in &[RELEASE_STREAM, FC_PUBLISH, FC_UNPUBLISH] {
            let packet = FmleStart::new(name, 2.0, "mystream");
            assert_eq!(FmleStart::decode(&packet.encode().unwrap()).unwrap(), packet);
        }
    }

    #[test]
    fn gives_error_on_other_command_names() {
        let packet = FmleStart::new("publish", 2.0, "mystream");
        match FmleStart::decode(&packet.encode().unwrap()) {
            Err(MessageDeserializationError::UnexpectedCommandName { .. }) => (),
            x => panic!("Expected UnexpectedCommandName, received {:?}", x),
        }
    }

    #[test]
    fn response_ends_with_undefined() {
        let bytes = FmleStartResponse { transaction_id: 3.0 }.encode().unwrap();
        let raw = lms_amf0::deserialize(&mut &bytes[..]).unwrap();

        assert_eq!(raw.last(), Some(&Amf0Value::Undefined));
        assert_eq!(FmleStartResponse::decode(&bytes).unwrap().transaction_id, 3.0);
    }
}
