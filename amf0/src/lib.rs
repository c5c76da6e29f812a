//! This crate provides functionality for serializing and deserializing data
//! based on the Adobe AMF0 encoding specification located at
//! <https://wwwimages2.adobe.com/content/dam/acom/en/devnet/pdf/amf0-file-format-specification.pdf>
//!
//! Objects and ECMA arrays are kept in an [`Amf0Object`], which remembers the order its
//! properties were inserted in.  RTMP peers are sensitive to property order in command
//! objects, so values always serialize in the same order they were decoded or built.
//!
//! # Examples
//! ```
//! use lms_amf0::{Amf0Object, Amf0Value, serialize, deserialize};
//!
//! let mut properties = Amf0Object::new();
//! properties.insert("app", Amf0Value::Number(99.0));
//! properties.insert("second", Amf0Value::Utf8String("test".to_string()));
//!
//! let input = vec![
//!     Amf0Value::Number(32.0),
//!     Amf0Value::Object(properties),
//!     Amf0Value::Boolean(true),
//! ];
//!
//! let serialized_data = serialize(&input).unwrap();
//! let results = deserialize(&mut &serialized_data[..]).unwrap();
//!
//! assert_eq!(input, results);
//! ```

mod deserialization;
mod errors;
mod object;
mod serialization;

pub use crate::deserialization::{deserialize, MAX_NESTING_DEPTH};
pub use crate::errors::{Amf0DeserializationError, Amf0SerializationError};
pub use crate::object::Amf0Object;
pub use crate::serialization::serialize;

/// An Enum representing the different supported types of Amf0 values
#[derive(PartialEq, Debug, Clone)]
pub enum Amf0Value {
    Number(f64),
    Boolean(bool),
    Utf8String(String),
    Object(Amf0Object),
    Null,
    Undefined,

    /// An associative array.  On the wire it differs from an object only by carrying
    /// an (unreliable) count of its entries.
    EcmaArray(Amf0Object),

    StrictArray(Vec<Amf0Value>),

    /// Milliseconds since the unix epoch plus a time zone offset that is supposed to
    /// always be zero.
    Date { unix_millis: f64, time_zone: i16 },
}

impl Amf0Value {
    pub fn get_number(self) -> Option<f64> {
        match self {
            Amf0Value::Number(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_boolean(self) -> Option<bool> {
        match self {
            Amf0Value::Boolean(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_string(self) -> Option<String> {
        match self {
            Amf0Value::Utf8String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the properties of an object or an ECMA array
    pub fn get_object_properties(self) -> Option<Amf0Object> {
        match self {
            Amf0Value::Object(properties) => Some(properties),
            Amf0Value::EcmaArray(properties) => Some(properties),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Amf0Value::Number(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match *self {
            Amf0Value::Boolean(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Amf0Value::Utf8String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Amf0Object> {
        match self {
            Amf0Value::Object(properties) => Some(properties),
            Amf0Value::EcmaArray(properties) => Some(properties),
            _ => None,
        }
    }

    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, Amf0Value::Null | Amf0Value::Undefined)
    }
}

impl From<f64> for Amf0Value {
    fn from(value: f64) -> Self {
        Amf0Value::Number(value)
    }
}

impl From<bool> for Amf0Value {
    fn from(value: bool) -> Self {
        Amf0Value::Boolean(value)
    }
}

impl From<&str> for Amf0Value {
    fn from(value: &str) -> Self {
        Amf0Value::Utf8String(value.to_string())
    }
}

impl From<String> for Amf0Value {
    fn from(value: String) -> Self {
        Amf0Value::Utf8String(value)
    }
}

impl From<Amf0Object> for Amf0Value {
    fn from(value: Amf0Object) -> Self {
        Amf0Value::Object(value)
    }
}

mod markers {
    pub const NUMBER_MARKER: u8 = 0;
    pub const BOOLEAN_MARKER: u8 = 1;
    pub const STRING_MARKER: u8 = 2;
    pub const OBJECT_MARKER: u8 = 3;
    pub const NULL_MARKER: u8 = 5;
    pub const UNDEFINED_MARKER: u8 = 6;
    pub const ECMA_ARRAY_MARKER: u8 = 8;
    pub const OBJECT_END_MARKER: u8 = 9;
    pub const STRICT_ARRAY_MARKER: u8 = 10;
    pub const DATE_MARKER: u8 = 11;
    pub const LONG_STRING_MARKER: u8 = 12;
    pub const UTF_8_EMPTY_MARKER: u16 = 0;
}
