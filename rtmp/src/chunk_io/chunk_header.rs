use crate::cursor::{ByteCursor, CursorError};
use bytes::{BufMut, BytesMut};

/// Largest value of the 3 byte timestamp field.  A field holding this value means a
/// 4 byte extended timestamp follows the message header.
pub const MAX_TIMESTAMP_FIELD: u32 = 0xFF_FFFF;

/// Largest payload the 3 byte message length field can describe
pub const MAX_MESSAGE_LENGTH: usize = 0xFF_FFFF;

pub const MIN_CHUNK_STREAM_ID: u32 = 2;
pub const MAX_CHUNK_STREAM_ID: u32 = 65599;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ChunkHeaderFormat {
    Full,                            // Format 0
    TimeDeltaWithoutMessageStreamId, // Format 1
    TimeDeltaOnly,                   // Format 2
    Empty,                           // Format 3
}

impl ChunkHeaderFormat {
    fn from_basic_header_byte(byte: u8) -> ChunkHeaderFormat {
        match byte >> 6 {
            0 => ChunkHeaderFormat::Full,
            1 => ChunkHeaderFormat::TimeDeltaWithoutMessageStreamId,
            2 => ChunkHeaderFormat::TimeDeltaOnly,
            _ => ChunkHeaderFormat::Empty,
        }
    }

    fn mask(self) -> u8 {
        match self {
            ChunkHeaderFormat::Full => 0b0000_0000,
            ChunkHeaderFormat::TimeDeltaWithoutMessageStreamId => 0b0100_0000,
            ChunkHeaderFormat::TimeDeltaOnly => 0b1000_0000,
            ChunkHeaderFormat::Empty => 0b1100_0000,
        }
    }
}

/// The last message header seen on a chunk stream
#[derive(Debug, Clone, Default)]
pub struct ChunkHeader {
    pub timestamp: u32,
    pub timestamp_delta: u32,
    pub message_length: u32,
    pub message_type_id: u8,
    pub message_stream_id: u32,
}

/// Reads the 1 to 3 byte basic header
pub fn read_basic_header(cursor: &mut ByteCursor) -> Result<(ChunkHeaderFormat, u32), CursorError> {
    const CSID_MASK: u8 = 0b0011_1111;

    let first = cursor.read_u8()?;
    let format = ChunkHeaderFormat::from_basic_header_byte(first);
    let csid = match first & CSID_MASK {
        0 => cursor.read_u8()? as u32 + 64,
        1 => {
            let low = cursor.read_u8()? as u32;
            let high = cursor.read_u8()? as u32;
            high * 256 + low + 64
        }
        x => x as u32,
    };

    Ok((format, csid))
}

/// Writes the basic header.  The csid must be between 2 and 65599.
pub fn write_basic_header(bytes: &mut BytesMut, format: ChunkHeaderFormat, csid: u32) {
    let mask = format.mask();
    match csid {
        x if x <= 63 => bytes.put_u8(mask | x as u8),
        x if x <= 319 => {
            bytes.put_u8(mask);
            bytes.put_u8((x - 64) as u8);
        }
        x => {
            let value = x - 64;
            bytes.put_u8(mask | 1);
            bytes.put_u8((value & 0xFF) as u8);
            bytes.put_u8((value >> 8) as u8);
        }
    }
}
