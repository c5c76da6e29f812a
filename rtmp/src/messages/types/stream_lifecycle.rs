use bytes::Bytes;
use lms_amf0::Amf0Value;

use super::command::{encode_values, CommandValues};
use super::connect::RESULT;
use crate::messages::{MessageDeserializationError, MessageSerializationError};

pub const CREATE_STREAM: &str = "createStream";
pub const DELETE_STREAM: &str = "deleteStream";
pub const CLOSE_STREAM: &str = "closeStream";

/// Asks the server for a message stream to publish or play on
#[derive(PartialEq, Debug, Clone)]
pub struct CreateStream {
    pub transaction_id: f64,
}

impl CreateStream {
    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(CREATE_STREAM.to_string()),
            Amf0Value::Number(self.transaction_id),
            Amf0Value::Null,
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        values.expect_name(CREATE_STREAM)?;

        Ok(CreateStream {
            transaction_id: values.number("transaction id")?,
        })
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct CreateStreamResponse {
    pub transaction_id: f64,
    pub stream_id: f64,
}

impl CreateStreamResponse {
    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(RESULT.to_string()),
            Amf0Value::Number(self.transaction_id),
            Amf0Value::Null,
            Amf0Value::Number(self.stream_id),
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        values.expect_name(RESULT)?;

        let transaction_id = values.number("transaction id")?;
        values.skip();

        Ok(CreateStreamResponse {
            transaction_id,
            stream_id: values.number("stream id")?,
        })
    }
}

/// Sent by a client when it is done with a message stream
#[derive(PartialEq, Debug, Clone)]
pub struct DeleteStream {
    pub transaction_id: f64,
    pub stream_id: f64,
}

impl DeleteStream {
    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(DELETE_STREAM.to_string()),
            Amf0Value::Number(self.transaction_id),
            Amf0Value::Null,
            Amf0Value::Number(self.stream_id),
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        values.expect_name(DELETE_STREAM)?;

        let transaction_id = values.number("transaction id")?;
        values.skip();

        Ok(DeleteStream {
            transaction_id,
            stream_id: values.number("stream id")?,
        })
    }
}

/// Stops publishing or playing on the message stream it is sent on
#[derive(PartialEq, Debug, Clone)]
pub struct CloseStream {
    pub transaction_id: f64,
}

impl CloseStream {
    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(CLOSE_STREAM.to_string()),
            Amf0Value::Number(self.transaction_id),
            Amf0Value::Null,
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        values.expect_name(CLOSE_STREAM)?;

        // Some clients leave the transaction id out entirely
        Ok(CloseStream {
            transaction_id: values.optional_number().unwrap_or(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_round_trip_create_stream() {
        let packet = CreateStream { transaction_id: 4.0 };
        assert_eq!(CreateStream::decode(&packet.encode().unwrap()).unwrap(), packet);
    }

    #[test]
    fn create_stream_response_carries_null_then_stream_id() {
        let packet = CreateStreamResponse {
            transaction_id: 4.0,
            stream_id: 1.0,
        };

        let bytes = packet.encode().unwrap();
        let raw = lms_amf0::deserialize(&mut &bytes[..]).unwrap();

        assert_eq!(
            raw,
            vec![
                Amf0Value::Utf8String("_result".to_string()),
                Amf0Value::Number(4.0),
                Amf0Value::Null,
                Amf0Value::Number(1.0),
            ]
        );

        assert_eq!(CreateStreamResponse::decode(&bytes).unwrap(), packet);
    }

    #[test]
    fn can_round_trip_delete_stream() {
        let packet = DeleteStream {
            transaction_id: 6.0,
            stream_id: 1.0,
        };

        assert_eq!(DeleteStream::decode(&packet.encode().unwrap()).unwrap(), packet);
    }

    #[test]
    fn can_decode_close_stream_without_transaction_id() {
        let bytes = lms_amf0::serialize(&[Amf0Value::Utf8String("closeStream".to_string())]).unwrap();
        assert_eq!(CloseStream::decode(&bytes).unwrap().transaction_id, 0.0);
    }
}
