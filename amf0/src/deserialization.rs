//! This module contains functionality to deserialize values from bytes
//! that were encoded via the AMF0 specification
//! (http://wwwimages.adobe.com/content/dam/Adobe/en/devnet/amf/pdf/amf0-file-format-specification.pdf)

use crate::errors::Amf0DeserializationError;
use crate::markers;
use crate::{Amf0Object, Amf0Value};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;

/// How deeply objects and arrays may nest inside each other before the input is refused
pub const MAX_NESTING_DEPTH: usize = 64;

/// Turns any readable byte stream and converts it into an array of AMF0 values.
///
/// Reading stops cleanly at the end of the stream.  A value that is cut off part way
/// through is an error.
pub fn deserialize<R: Read>(bytes: &mut R) -> Result<Vec<Amf0Value>, Amf0DeserializationError> {
    let mut results = vec![];

    while let Some(value) = read_next_value(bytes, 0)? {
        results.push(value);
    }

    Ok(results)
}

fn read_next_value<R: Read>(bytes: &mut R, depth: usize) -> Result<Option<Amf0Value>, Amf0DeserializationError> {
    let mut buffer: [u8; 1] = [0];
    let bytes_read = bytes.read(&mut buffer)?;

    if bytes_read == 0 {
        return Ok(None);
    }

    if buffer[0] == markers::OBJECT_END_MARKER {
        return Ok(None);
    }

    read_value_with_marker(buffer[0], bytes, depth).map(Some)
}

fn read_value_with_marker<R: Read>(
    marker: u8,
    bytes: &mut R,
    depth: usize,
) -> Result<Amf0Value, Amf0DeserializationError> {
    match marker {
        markers::OBJECT_MARKER | markers::ECMA_ARRAY_MARKER | markers::STRICT_ARRAY_MARKER
            if depth >= MAX_NESTING_DEPTH =>
        {
            return Err(Amf0DeserializationError::NestingTooDeep {
                max_depth: MAX_NESTING_DEPTH,
            });
        }

        _ => (),
    }

    match marker {
        markers::BOOLEAN_MARKER => parse_bool(bytes),
        markers::NULL_MARKER => Ok(Amf0Value::Null),
        markers::UNDEFINED_MARKER => Ok(Amf0Value::Undefined),
        markers::NUMBER_MARKER => parse_number(bytes),
        markers::OBJECT_MARKER => parse_object(bytes, depth + 1).map(Amf0Value::Object),
        markers::ECMA_ARRAY_MARKER => parse_ecma_array(bytes, depth + 1),
        markers::STRING_MARKER => parse_string(bytes),
        markers::LONG_STRING_MARKER => parse_long_string(bytes),
        markers::STRICT_ARRAY_MARKER => parse_strict_array(bytes, depth + 1),
        markers::DATE_MARKER => parse_date(bytes),
        _ => Err(Amf0DeserializationError::UnknownMarker { marker }),
    }
}

fn parse_number<R: Read>(bytes: &mut R) -> Result<Amf0Value, Amf0DeserializationError> {
    let number = read_or_eof(bytes.read_f64::<BigEndian>())?;
    Ok(Amf0Value::Number(number))
}

fn parse_bool<R: Read>(bytes: &mut R) -> Result<Amf0Value, Amf0DeserializationError> {
    let value = read_or_eof(bytes.read_u8())?;
    Ok(Amf0Value::Boolean(value != 0))
}

fn parse_string<R: Read>(bytes: &mut R) -> Result<Amf0Value, Amf0DeserializationError> {
    let length = read_or_eof(bytes.read_u16::<BigEndian>())?;
    read_utf8(bytes, length as usize).map(Amf0Value::Utf8String)
}

fn parse_long_string<R: Read>(bytes: &mut R) -> Result<Amf0Value, Amf0DeserializationError> {
    let length = read_or_eof(bytes.read_u32::<BigEndian>())?;
    read_utf8(bytes, length as usize).map(Amf0Value::Utf8String)
}

fn parse_date<R: Read>(bytes: &mut R) -> Result<Amf0Value, Amf0DeserializationError> {
    let unix_millis = read_or_eof(bytes.read_f64::<BigEndian>())?;
    let time_zone = read_or_eof(bytes.read_i16::<BigEndian>())?;
    Ok(Amf0Value::Date {
        unix_millis,
        time_zone,
    })
}

fn parse_object<R: Read>(bytes: &mut R, depth: usize) -> Result<Amf0Object, Amf0DeserializationError> {
    let mut properties = Amf0Object::new();

    while let Some((label, value)) = parse_object_property(bytes, depth)? {
        properties.insert(label, value);
    }

    Ok(properties)
}

fn parse_ecma_array<R: Read>(bytes: &mut R, depth: usize) -> Result<Amf0Value, Amf0DeserializationError> {
    // The associative count is not reliable in the wild, and encoders always terminate
    // the array with the same 0x000009 ending that objects use.  Read it like an object.
    let _associative_count = read_or_eof(bytes.read_u32::<BigEndian>())?;
    parse_object(bytes, depth).map(Amf0Value::EcmaArray)
}

fn parse_strict_array<R: Read>(bytes: &mut R, depth: usize) -> Result<Amf0Value, Amf0DeserializationError> {
    let array_count = read_or_eof(bytes.read_u32::<BigEndian>())?;
    let mut values = Vec::new();

    for _ in 0..array_count {
        match read_next_value(bytes, depth)? {
            Some(value) => values.push(value),
            None => return Err(Amf0DeserializationError::UnexpectedEof),
        }
    }

    Ok(Amf0Value::StrictArray(values))
}

fn parse_object_property<R: Read>(
    bytes: &mut R,
    depth: usize,
) -> Result<Option<(String, Amf0Value)>, Amf0DeserializationError> {
    let label_length = read_or_eof(bytes.read_u16::<BigEndian>())?;
    if label_length == 0 {
        // Next byte should be the end of object marker.  It has to be read to progress
        // past the object.
        let byte = read_or_eof(bytes.read_u8())?;
        if byte != markers::OBJECT_END_MARKER {
            return Err(Amf0DeserializationError::UnexpectedEmptyObjectPropertyName);
        }

        return Ok(None);
    }

    let label = read_utf8(bytes, label_length as usize)?;

    match read_next_value(bytes, depth)? {
        None => Err(Amf0DeserializationError::UnexpectedEof),
        Some(value) => Ok(Some((label, value))),
    }
}

fn read_utf8<R: Read>(bytes: &mut R, length: usize) -> Result<String, Amf0DeserializationError> {
    let mut buffer = vec![0_u8; length];
    read_or_eof(bytes.read_exact(&mut buffer))?;

    Ok(String::from_utf8(buffer)?)
}

fn read_or_eof<T>(result: std::io::Result<T>) -> Result<T, Amf0DeserializationError> {
    result.map_err(|error| match error.kind() {
        std::io::ErrorKind::UnexpectedEof => Amf0DeserializationError::UnexpectedEof,
        _ => Amf0DeserializationError::Io(error),
    })
}

#[cfg(test)]
mod tests {
    use super::{deserialize, MAX_NESTING_DEPTH};
    use crate::errors::Amf0DeserializationError;
    use crate::markers;
    use crate::{Amf0Object, Amf0Value};
    use byteorder::{BigEndian, WriteBytesExt};
    use std::io::Cursor;

    #[test]
    fn can_deserialize_strict_array() {
        let mut vector = vec![];
        vector.push(markers::STRICT_ARRAY_MARKER);
        vector.write_u32::<BigEndian>(2).unwrap();
        vector.push(markers::NUMBER_MARKER);
        vector.write_f64::<BigEndian>(1.0).unwrap();
        vector.push(markers::NUMBER_MARKER);
        vector.write_f64::<BigEndian>(2.0).unwrap();

        let mut input = Cursor::new(vector);
        let result = deserialize(&mut input).unwrap();

        let array = vec![Amf0Value::Number(1.0), Amf0Value::Number(2.0)];
        let expected = vec![Amf0Value::StrictArray(array)];
        assert_eq!(result, expected);
    }

    #[test]
    fn can_deserialize_number() {
        let number: f64 = 332.0;

        let mut vector = vec![];
        vector.write_u8(markers::NUMBER_MARKER).unwrap();
        vector.write_f64::<BigEndian>(number).unwrap();

        let mut input = Cursor::new(vector);
        let result = deserialize(&mut input).unwrap();

        let expected = vec![Amf0Value::Number(number)];
        assert_eq!(result, expected);
    }

    #[test]
    fn can_deserialize_booleans() {
        let vector = vec![markers::BOOLEAN_MARKER, 1, markers::BOOLEAN_MARKER, 0];

        let mut input = Cursor::new(vector);
        let result = deserialize(&mut input).unwrap();

        let expected = vec![Amf0Value::Boolean(true), Amf0Value::Boolean(false)];
        assert_eq!(result, expected);
    }

    #[test]
    fn can_deserialize_string() {
        let value = "test";

        let mut vector = vec![];
        vector.write_u8(markers::STRING_MARKER).unwrap();
        vector.write_u16::<BigEndian>(value.len() as u16).unwrap();
        vector.extend(value.as_bytes());

        let mut input = Cursor::new(vector);
        let result = deserialize(&mut input).unwrap();

        let expected = vec![Amf0Value::Utf8String(value.to_string())];
        assert_eq!(result, expected);
    }

    #[test]
    fn can_deserialize_long_string() {
        let value = "long test";

        let mut vector = vec![];
        vector.write_u8(markers::LONG_STRING_MARKER).unwrap();
        vector.write_u32::<BigEndian>(value.len() as u32).unwrap();
        vector.extend(value.as_bytes());

        let result = deserialize(&mut Cursor::new(vector)).unwrap();

        assert_eq!(result, vec![Amf0Value::Utf8String(value.to_string())]);
    }

    #[test]
    fn can_deserialize_null_and_undefined() {
        let vector = vec![markers::NULL_MARKER, markers::UNDEFINED_MARKER];

        let mut input = Cursor::new(vector);
        let result = deserialize(&mut input).unwrap();

        assert_eq!(result, vec![Amf0Value::Null, Amf0Value::Undefined]);
    }

    #[test]
    fn can_deserialize_object() {
        const NUMBER: f64 = 332.0;

        let mut vector = vec![];
        vector.push(markers::OBJECT_MARKER);
        vector.write_u16::<BigEndian>(4).unwrap();
        vector.extend("test".as_bytes());
        vector.push(markers::NUMBER_MARKER);
        vector.write_f64::<BigEndian>(NUMBER).unwrap();
        vector.write_u16::<BigEndian>(markers::UTF_8_EMPTY_MARKER).unwrap();
        vector.push(markers::OBJECT_END_MARKER);

        let mut input = Cursor::new(vector);
        let result = deserialize(&mut input).unwrap();

        let mut properties = Amf0Object::new();
        properties.insert("test", Amf0Value::Number(NUMBER));

        let expected = vec![Amf0Value::Object(properties)];
        assert_eq!(result, expected);
    }

    #[test]
    fn can_deserialize_ecma_array_in_wire_order() {
        let mut vector = vec![];
        vector.push(markers::ECMA_ARRAY_MARKER);
        vector.write_u32::<BigEndian>(2).unwrap();
        vector.write_u16::<BigEndian>(5).unwrap();
        vector.extend("test2".as_bytes());
        vector.push(markers::NUMBER_MARKER);
        vector.write_f64::<BigEndian>(1.0).unwrap();
        vector.write_u16::<BigEndian>(5).unwrap();
        vector.extend("test1".as_bytes());
        vector.write_u8(markers::STRING_MARKER).unwrap();
        vector.write_u16::<BigEndian>(6).unwrap();
        vector.extend("second".as_bytes());
        vector.write_u16::<BigEndian>(markers::UTF_8_EMPTY_MARKER).unwrap();
        vector.push(markers::OBJECT_END_MARKER);

        let mut input = Cursor::new(vector);
        let result = deserialize(&mut input).unwrap();

        let mut properties = Amf0Object::new();
        properties.insert("test2", Amf0Value::Number(1.0));
        properties.insert("test1", Amf0Value::Utf8String("second".to_string()));

        let expected = vec![Amf0Value::EcmaArray(properties)];
        assert_eq!(result, expected);

        let keys: Vec<&str> = result[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["test2", "test1"]);
    }

    #[test]
    fn can_deserialize_date() {
        let mut vector = vec![markers::DATE_MARKER];
        vector.write_f64::<BigEndian>(1234.0).unwrap();
        vector.write_i16::<BigEndian>(0).unwrap();

        let result = deserialize(&mut Cursor::new(vector)).unwrap();

        assert_eq!(
            result,
            vec![Amf0Value::Date {
                unix_millis: 1234.0,
                time_zone: 0
            }]
        );
    }

    #[test]
    fn gives_error_on_unknown_marker() {
        let vector = vec![0x20];

        match deserialize(&mut Cursor::new(vector)) {
            Err(Amf0DeserializationError::UnknownMarker { marker: 0x20 }) => (),
            x => panic!("Expected UnknownMarker error, received {:?}", x),
        }
    }

    #[test]
    fn gives_error_on_truncated_number() {
        let vector = vec![markers::NUMBER_MARKER, 0x40, 0x00];

        match deserialize(&mut Cursor::new(vector)) {
            Err(Amf0DeserializationError::UnexpectedEof) => (),
            x => panic!("Expected UnexpectedEof error, received {:?}", x),
        }
    }

    fn nested_objects(levels: usize) -> Vec<u8> {
        let mut vector = vec![];
        for _ in 0..levels {
            vector.push(markers::OBJECT_MARKER);
            vector.write_u16::<BigEndian>(1).unwrap();
            vector.push(b'a');
        }

        vector.push(markers::NULL_MARKER);
        for _ in 0..levels {
            vector.write_u16::<BigEndian>(markers::UTF_8_EMPTY_MARKER).unwrap();
            vector.push(markers::OBJECT_END_MARKER);
        }

        vector
    }

    #[test]
    fn can_deserialize_objects_nested_to_the_limit() {
        let result = deserialize(&mut Cursor::new(nested_objects(MAX_NESTING_DEPTH))).unwrap();

        let mut value = &result[0];
        for _ in 0..MAX_NESTING_DEPTH {
            value = value.as_object().unwrap().get("a").unwrap();
        }

        assert_eq!(value, &Amf0Value::Null);
    }

    #[test]
    fn gives_error_on_excessive_nesting() {
        let vector = nested_objects(200_000);

        match deserialize(&mut Cursor::new(vector)) {
            Err(Amf0DeserializationError::NestingTooDeep { max_depth }) => {
                assert_eq!(max_depth, MAX_NESTING_DEPTH)
            }
            x => panic!("Expected NestingTooDeep error, received {:?}", x),
        }
    }

    #[test]
    fn gives_error_on_excessive_array_nesting() {
        let mut vector = vec![];
        for _ in 0..=MAX_NESTING_DEPTH {
            vector.push(markers::STRICT_ARRAY_MARKER);
            vector.write_u32::<BigEndian>(1).unwrap();
        }

        vector.push(markers::NULL_MARKER);

        match deserialize(&mut Cursor::new(vector)) {
            Err(Amf0DeserializationError::NestingTooDeep { .. }) => (),
            x => panic!("Expected NestingTooDeep error, received {:?}", x),
        }
    }

    #[test]
    fn gives_error_on_object_missing_property_value() {
        let mut vector = vec![markers::OBJECT_MARKER];
        vector.write_u16::<BigEndian>(1).unwrap();
        vector.push(b'a');

        match deserialize(&mut Cursor::new(vector)) {
            Err(Amf0DeserializationError::UnexpectedEof) => (),
            x => panic!("Expected UnexpectedEof error, received {:?}", x),
        }
    }
}
