//! Module contains functionality for serializing values into an
//! bytes based on the AMF0 specification
//! (http://wwwimages.adobe.com/content/dam/Adobe/en/devnet/amf/pdf/amf0-file-format-specification.pdf)

use crate::errors::Amf0SerializationError;
use crate::markers;
use crate::{Amf0Object, Amf0Value};
use byteorder::{BigEndian, WriteBytesExt};

/// Serializes values into an amf0 encoded vector of bytes
pub fn serialize(values: &[Amf0Value]) -> Result<Vec<u8>, Amf0SerializationError> {
    let mut bytes = vec![];
    for value in values {
        serialize_value(value, &mut bytes)?;
    }

    Ok(bytes)
}

fn serialize_value(value: &Amf0Value, bytes: &mut Vec<u8>) -> Result<(), Amf0SerializationError> {
    match *value {
        Amf0Value::Boolean(val) => Ok(serialize_bool(val, bytes)),
        Amf0Value::Null => Ok(serialize_null(bytes)),
        Amf0Value::Undefined => Ok(serialize_undefined(bytes)),
        Amf0Value::Number(val) => serialize_number(val, bytes),
        Amf0Value::Utf8String(ref val) => serialize_string(val, bytes),
        Amf0Value::Object(ref val) => serialize_object(val, bytes),
        Amf0Value::EcmaArray(ref val) => serialize_ecma_array(val, bytes),
        Amf0Value::StrictArray(ref val) => serialize_strict_array(val, bytes),
        Amf0Value::Date {
            unix_millis,
            time_zone,
        } => serialize_date(unix_millis, time_zone, bytes),
    }
}

fn serialize_number(value: f64, bytes: &mut Vec<u8>) -> Result<(), Amf0SerializationError> {
    bytes.push(markers::NUMBER_MARKER);
    bytes.write_f64::<BigEndian>(value)?;
    Ok(())
}

fn serialize_bool(value: bool, bytes: &mut Vec<u8>) {
    bytes.push(markers::BOOLEAN_MARKER);
    bytes.push(value as u8);
}

fn serialize_string(value: &str, bytes: &mut Vec<u8>) -> Result<(), Amf0SerializationError> {
    if value.len() > u16::MAX as usize {
        bytes.push(markers::LONG_STRING_MARKER);
        bytes.write_u32::<BigEndian>(value.len() as u32)?;
    } else {
        bytes.push(markers::STRING_MARKER);
        bytes.write_u16::<BigEndian>(value.len() as u16)?;
    }

    bytes.extend(value.as_bytes());
    Ok(())
}

fn serialize_null(bytes: &mut Vec<u8>) {
    bytes.push(markers::NULL_MARKER);
}

fn serialize_undefined(bytes: &mut Vec<u8>) {
    bytes.push(markers::UNDEFINED_MARKER);
}

fn serialize_object(properties: &Amf0Object, bytes: &mut Vec<u8>) -> Result<(), Amf0SerializationError> {
    bytes.push(markers::OBJECT_MARKER);
    serialize_properties(properties, bytes)
}

fn serialize_ecma_array(properties: &Amf0Object, bytes: &mut Vec<u8>) -> Result<(), Amf0SerializationError> {
    bytes.push(markers::ECMA_ARRAY_MARKER);
    bytes.write_u32::<BigEndian>(properties.len() as u32)?;
    serialize_properties(properties, bytes)
}

fn serialize_properties(properties: &Amf0Object, bytes: &mut Vec<u8>) -> Result<(), Amf0SerializationError> {
    for (name, value) in properties.iter() {
        if name.len() > u16::MAX as usize {
            return Err(Amf0SerializationError::PropertyNameTooLong { length: name.len() });
        }

        bytes.write_u16::<BigEndian>(name.len() as u16)?;
        bytes.extend(name.as_bytes());
        serialize_value(value, bytes)?;
    }

    bytes.write_u16::<BigEndian>(markers::UTF_8_EMPTY_MARKER)?;
    bytes.push(markers::OBJECT_END_MARKER);
    Ok(())
}

fn serialize_strict_array(array: &[Amf0Value], bytes: &mut Vec<u8>) -> Result<(), Amf0SerializationError> {
    if array.len() > u32::MAX as usize {
        return Err(Amf0SerializationError::ArrayTooLong);
    }

    bytes.push(markers::STRICT_ARRAY_MARKER);
    bytes.write_u32::<BigEndian>(array.len() as u32)?;

    for value in array {
        serialize_value(value, bytes)?;
    }

    Ok(())
}

fn serialize_date(unix_millis: f64, time_zone: i16, bytes: &mut Vec<u8>) -> Result<(), Amf0SerializationError> {
    bytes.push(markers::DATE_MARKER);
    bytes.write_f64::<BigEndian>(unix_millis)?;
    bytes.write_i16::<BigEndian>(time_zone)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::serialize;
    use crate::errors::Amf0SerializationError;
    use crate::markers;
    use crate::{Amf0Object, Amf0Value};
    use byteorder::{BigEndian, WriteBytesExt};

    #[test]
    fn can_serialize_strict_array() {
        let number: f64 = 332.0;
        let input = vec![Amf0Value::StrictArray(vec![Amf0Value::Number(number)])];
        let result = serialize(&input).unwrap();

        let mut expected = vec![];
        expected.write_u8(markers::STRICT_ARRAY_MARKER).unwrap();
        expected.write_u32::<BigEndian>(1).unwrap();
        expected.write_u8(markers::NUMBER_MARKER).unwrap();
        expected.write_f64::<BigEndian>(number).unwrap();

        assert_eq!(result, expected);
    }

    #[test]
    fn can_serialize_number() {
        let number: f64 = 332.0;

        let input = vec![Amf0Value::Number(number)];
        let result = serialize(&input).unwrap();

        let mut expected = vec![];
        expected.write_u8(markers::NUMBER_MARKER).unwrap();
        expected.write_f64::<BigEndian>(number).unwrap();

        assert_eq!(result, expected);
    }

    #[test]
    fn can_serialize_booleans() {
        let input = vec![Amf0Value::Boolean(true), Amf0Value::Boolean(false)];
        let result = serialize(&input).unwrap();

        let expected = vec![markers::BOOLEAN_MARKER, 1, markers::BOOLEAN_MARKER, 0];
        assert_eq!(result, expected);
    }

    #[test]
    fn can_serialize_string() {
        let value = "test";

        let input = vec![Amf0Value::Utf8String(value.to_string())];
        let result = serialize(&input).unwrap();

        let mut expected = vec![];
        expected.write_u8(markers::STRING_MARKER).unwrap();
        expected.write_u16::<BigEndian>(value.len() as u16).unwrap();
        expected.extend(value.as_bytes());

        assert_eq!(result, expected);
    }

    #[test]
    fn strings_longer_than_u16_are_written_as_long_strings() {
        let value = "a".repeat(u16::MAX as usize + 1);

        let input = vec![Amf0Value::Utf8String(value.clone())];
        let result = serialize(&input).unwrap();

        let mut expected = vec![];
        expected.write_u8(markers::LONG_STRING_MARKER).unwrap();
        expected.write_u32::<BigEndian>(value.len() as u32).unwrap();
        expected.extend(value.as_bytes());

        assert_eq!(result, expected);
    }

    #[test]
    fn can_serialize_null_and_undefined() {
        let input = vec![Amf0Value::Null, Amf0Value::Undefined];
        let result = serialize(&input).unwrap();

        assert_eq!(result, vec![markers::NULL_MARKER, markers::UNDEFINED_MARKER]);
    }

    #[test]
    fn can_serialize_object() {
        const NUMBER: f64 = 332.0;

        let mut properties = Amf0Object::new();
        properties.insert("test", Amf0Value::Number(NUMBER));

        let input = vec![Amf0Value::Object(properties)];
        let result = serialize(&input).unwrap();

        let mut expected = vec![];
        expected.push(markers::OBJECT_MARKER);
        expected.write_u16::<BigEndian>(4).unwrap();
        expected.extend("test".as_bytes());
        expected.push(markers::NUMBER_MARKER);
        expected.write_f64::<BigEndian>(NUMBER).unwrap();
        expected.write_u16::<BigEndian>(markers::UTF_8_EMPTY_MARKER).unwrap();
        expected.push(markers::OBJECT_END_MARKER);

        assert_eq!(result, expected);
    }

    #[test]
    fn object_properties_are_written_in_insertion_order() {
        let mut properties = Amf0Object::new();
        properties.insert("b", Amf0Value::Null);
        properties.insert("a", Amf0Value::Null);

        let result = serialize(&[Amf0Value::Object(properties)]).unwrap();

        let mut expected = vec![markers::OBJECT_MARKER];
        expected.write_u16::<BigEndian>(1).unwrap();
        expected.push(b'b');
        expected.push(markers::NULL_MARKER);
        expected.write_u16::<BigEndian>(1).unwrap();
        expected.push(b'a');
        expected.push(markers::NULL_MARKER);
        expected.write_u16::<BigEndian>(markers::UTF_8_EMPTY_MARKER).unwrap();
        expected.push(markers::OBJECT_END_MARKER);

        assert_eq!(result, expected);
    }

    #[test]
    fn can_serialize_ecma_array() {
        let mut properties = Amf0Object::new();
        properties.insert("duration", Amf0Value::Number(0.0));

        let result = serialize(&[Amf0Value::EcmaArray(properties)]).unwrap();

        let mut expected = vec![markers::ECMA_ARRAY_MARKER];
        expected.write_u32::<BigEndian>(1).unwrap();
        expected.write_u16::<BigEndian>(8).unwrap();
        expected.extend(b"duration");
        expected.push(markers::NUMBER_MARKER);
        expected.write_f64::<BigEndian>(0.0).unwrap();
        expected.write_u16::<BigEndian>(markers::UTF_8_EMPTY_MARKER).unwrap();
        expected.push(markers::OBJECT_END_MARKER);

        assert_eq!(result, expected);
    }

    #[test]
    fn can_serialize_date() {
        let input = vec![Amf0Value::Date {
            unix_millis: 1_500_000_000_000.0,
            time_zone: 0,
        }];

        let result = serialize(&input).unwrap();

        let mut expected = vec![markers::DATE_MARKER];
        expected.write_f64::<BigEndian>(1_500_000_000_000.0).unwrap();
        expected.write_i16::<BigEndian>(0).unwrap();

        assert_eq!(result, expected);
    }

    #[test]
    fn error_when_property_name_length_greater_than_u16() {
        let mut properties = Amf0Object::new();
        properties.insert("a".repeat(u16::MAX as usize + 1), Amf0Value::Null);

        let result = serialize(&[Amf0Value::Object(properties)]);

        match result {
            Err(Amf0SerializationError::PropertyNameTooLong { length }) => {
                assert_eq!(length, u16::MAX as usize + 1)
            }
            x => panic!("Expected PropertyNameTooLong, received {:?}", x),
        }
    }
}
