use bytes::Bytes;
use lms_amf0::Amf0Value;

use super::command::{encode_values, CommandValues};
use crate::messages::{MessageDeserializationError, MessageSerializationError};

pub const PLAY: &str = "play";

/// Starts playback of a stream.
///
/// A `start` of -2 plays live if available and falls back to recorded, -1 plays live only.  A
/// `duration` of -1 plays until the stream ends.
#[derive(PartialEq, Debug, Clone)]
pub struct Play {
    pub transaction_id: f64,
    pub stream_name: String,
    pub start: f64,
    pub duration: f64,
    pub reset: bool,
}

impl Play {
    pub fn new(stream_name: &str) -> Self {
        Play {
            transaction_id: 0.0,
            stream_name: stream_name.to_string(),
            start: -2.0,
            duration: -1.0,
            reset: true,
        }
    }

    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(PLAY.to_string()),
            Amf0Value::Number(self.transaction_id),
            Amf0Value::Null,
            Amf0Value::Utf8String(self.stream_name.clone()),
            Amf0Value::Number(self.start),
            Amf0Value::Number(self.duration),
            Amf0Value::Boolean(self.reset),
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        values.expect_name(PLAY)?;

        let transaction_id = values.number("transaction id")?;
        values.skip();

        let mut packet = Play::new(&values.string("stream name")?);
        packet.transaction_id = transaction_id;

        if let Some(start) = values.optional_number() {
            packet.start = start;
        }

        if let Some(duration) = values.optional_number() {
            packet.duration = duration;
        }

        // Older clients send reset as a number
        match values.next_value() {
            Some(Amf0Value::Boolean(reset)) => packet.reset = reset,
            Some(Amf0Value::Number(reset)) => packet.reset = reset != 0.0,
            _ => (),
        }

        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_round_trip_play() {
        let mut packet = Play::new("mystream");
        packet.transaction_id = 4.0;
        packet.start = 0.0;
        packet.duration = 30.0;
        packet.reset = false;

        assert_eq!(Play::decode(&packet.encode().unwrap()).unwrap(), packet);
    }

    #[test]
    fn missing_optional_arguments_get_defaults() {
        let bytes = lms_amf0::serialize(&[
            Amf0Value::Utf8String("play".to_string()),
            Amf0Value::Number(4.0),
            Amf0Value::Null,
            Amf0Value::Utf8String("mystream".to_string()),
        ])
        .unwrap();

        let packet = Play::decode(&bytes).unwrap();
        assert_eq!(packet.start, -2.0);
        assert_eq!(packet.duration, -1.0);
        assert!(packet.reset);
    }

    #[test]
    fn can_decode_numeric_reset_flag() {
        let bytes = lms_amf0::serialize(&[
            Amf0Value::Utf8String("play".to_string()),
            Amf0Value::Number(4.0),
            Amf0Value::Null,
            Amf0Value::Utf8String("mystream".to_string()),
            Amf0Value::Number(-1.0),
            Amf0Value::Number(-1.0),
            Amf0Value::Number(0.0),
        ])
        .unwrap();

        let packet = Play::decode(&bytes).unwrap();
        assert_eq!(packet.start, -1.0);
        assert!(!packet.reset);
    }
}
