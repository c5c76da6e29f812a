use std::{io, string};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Amf0DeserializationError {
    #[error("Encountered unknown marker: {marker}")]
    UnknownMarker { marker: u8 },

    #[error("Unexpected empty object property name")]
    UnexpectedEmptyObjectPropertyName,

    #[error("Objects and arrays are nested more than {max_depth} levels deep")]
    NestingTooDeep { max_depth: usize },

    #[error("Hit end of the byte buffer but was expecting more data")]
    UnexpectedEof,

    #[error("Failed to read bytes: {0}")]
    Io(#[from] io::Error),

    #[error("String was not valid utf-8: {0}")]
    FromUtf8Error(#[from] string::FromUtf8Error),
}

#[derive(Debug, Error)]
pub enum Amf0SerializationError {
    #[error("Object property name of {length} bytes is longer than 65,535 bytes")]
    PropertyNameTooLong { length: usize },

    #[error("Array has more than 4,294,967,295 entries")]
    ArrayTooLong,

    #[error("Failed to write bytes: {0}")]
    Io(#[from] io::Error),
}
