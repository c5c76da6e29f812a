//! Helpers shared by the AMF0 command and data packets.

use bytes::Bytes;
use lms_amf0::{Amf0Object, Amf0Value};
use std::vec::IntoIter;

use crate::cursor::ByteCursor;
use crate::messages::{MessageDeserializationError, MessageSerializationError};

const STRING_MARKER: u8 = 0x02;

/// Reads only the leading name of a command or data message, without decoding the rest of it.
pub fn read_command_name(payload: &[u8]) -> Result<String, MessageDeserializationError> {
    let mut cursor = ByteCursor::new(payload);
    if cursor.read_u8()? != STRING_MARKER {
        return Err(MessageDeserializationError::InvalidField { field: "command name" });
    }

    let length = cursor.read_u16()? as usize;
    let name = cursor.read_bytes(length)?;
    String::from_utf8(name.to_vec()).map_err(|_| MessageDeserializationError::InvalidField { field: "command name" })
}

pub fn encode_values(values: &[Amf0Value]) -> Result<Bytes, MessageSerializationError> {
    let bytes = lms_amf0::serialize(values)?;
    Ok(Bytes::from(bytes))
}

/// Positional reader over the decoded values of a command
pub struct CommandValues {
    values: IntoIter<Amf0Value>,
}

impl CommandValues {
    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut reader = payload;
        let values = lms_amf0::deserialize(&mut reader)?;
        Ok(CommandValues {
            values: values.into_iter(),
        })
    }

    /// Consumes the name and fails unless it is exactly `expected`
    pub fn expect_name(&mut self, expected: &'static str) -> Result<(), MessageDeserializationError> {
        let name = self.string("command name")?;
        if name != expected {
            return Err(MessageDeserializationError::UnexpectedCommandName { expected, received: name });
        }

        Ok(())
    }

    /// Consumes the name and fails unless it is one of `allowed`
    pub fn expect_name_in(&mut self, allowed: &[&'static str]) -> Result<String, MessageDeserializationError> {
        let name = self.string("command name")?;
        if !allowed.contains(&name.as_str()) {
            return Err(MessageDeserializationError::UnexpectedCommandName {
                expected: allowed.first().copied().unwrap_or_default(),
                received: name,
            });
        }

        Ok(name)
    }

    pub fn string(&mut self, field: &'static str) -> Result<String, MessageDeserializationError> {
        self.values
            .next()
            .and_then(Amf0Value::get_string)
            .ok_or(MessageDeserializationError::InvalidField { field })
    }

    pub fn number(&mut self, field: &'static str) -> Result<f64, MessageDeserializationError> {
        self.values
            .next()
            .and_then(Amf0Value::get_number)
            .ok_or(MessageDeserializationError::InvalidField { field })
    }

    /// An object or an ECMA array
    pub fn object(&mut self, field: &'static str) -> Result<Amf0Object, MessageDeserializationError> {
        self.values
            .next()
            .and_then(Amf0Value::get_object_properties)
            .ok_or(MessageDeserializationError::InvalidField { field })
    }

    /// Skips the command object slot, which for most commands is a null
    pub fn skip(&mut self) {
        let _ = self.values.next();
    }

    pub fn optional_string(&mut self) -> Option<String> {
        self.values.next().and_then(Amf0Value::get_string)
    }

    pub fn optional_number(&mut self) -> Option<f64> {
        self.values.next().and_then(Amf0Value::get_number)
    }

    pub fn optional_object(&mut self) -> Option<Amf0Object> {
        self.values.next().and_then(Amf0Value::get_object_properties)
    }

    pub fn next_value(&mut self) -> Option<Amf0Value> {
        self.values.next()
    }
}

/// Builds the `{level, code, description}` object carried by status notifications
pub fn status_object(level: &str, code: &str, description: &str) -> Amf0Object {
    let mut object = Amf0Object::with_capacity(3);
    object.insert("level", level);
    object.insert("code", code);
    object.insert("description", description);
    object
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_read_command_name_without_decoding_rest() {
        let mut bytes = lms_amf0::serialize(&[Amf0Value::Utf8String("connect".to_string())]).unwrap();
        bytes.extend_from_slice(&[0xFF, 0xFF]);

        assert_eq!(read_command_name(&bytes).unwrap(), "connect");
    }

    #[test]
    fn gives_error_when_first_value_is_not_a_string() {
        let bytes = lms_amf0::serialize(&[Amf0Value::Number(1.0)]).unwrap();
        match read_command_name(&bytes) {
            Err(MessageDeserializationError::InvalidField { field: "command name" }) => (),
            x => panic!("Expected InvalidField, received {:?}", x),
        }
    }

    #[test]
    fn gives_error_on_unexpected_command_name() {
        let bytes = lms_amf0::serialize(&[Amf0Value::Utf8String("play".to_string())]).unwrap();
        let mut values = CommandValues::decode(&bytes).unwrap();

        match values.expect_name("publish") {
            Err(MessageDeserializationError::UnexpectedCommandName { expected: "publish", received }) => {
                assert_eq!(received, "play")
            }
            x => panic!("Expected UnexpectedCommandName, received {:?}", x),
        }
    }

    #[test]
    fn status_object_keeps_field_order() {
        let object = status_object("status", "NetStream.Publish.Start", "Started");
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["level", "code", "description"]);
    }
}
