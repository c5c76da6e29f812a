//! Bounds checked reading of big endian integers out of a byte slice.
//!
//! Every read either succeeds completely or leaves the cursor where it was, so callers can
//! peek at a partially received structure, discover it is incomplete, and try again later
//! once more bytes have arrived.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("Needed {needed} more bytes but only {available} remain")]
    NotEnoughBytes { needed: usize, available: usize },
}

/// A read position over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, position: 0 }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// True when at least `count` more bytes can be read
    pub fn has(&self, count: usize) -> bool {
        self.remaining() >= count
    }

    pub fn read_u8(&mut self) -> Result<u8, CursorError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CursorError> {
        self.read_bytes(2).map(BigEndian::read_u16)
    }

    pub fn read_u24(&mut self) -> Result<u32, CursorError> {
        self.read_bytes(3).map(BigEndian::read_u24)
    }

    pub fn read_u32(&mut self) -> Result<u32, CursorError> {
        self.read_bytes(4).map(BigEndian::read_u32)
    }

    /// Message stream ids in chunk headers are the one little endian field in RTMP
    pub fn read_u32_le(&mut self) -> Result<u32, CursorError> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], CursorError> {
        if !self.has(count) {
            return Err(CursorError::NotEnoughBytes {
                needed: count,
                available: self.remaining(),
            });
        }

        let start = self.position;
        self.position += count;
        Ok(&self.data[start..self.position])
    }

    pub fn skip(&mut self, count: usize) -> Result<(), CursorError> {
        self.read_bytes(count).map(|_| ())
    }

    /// Everything that has not been read yet, without consuming it
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.position..]
    }
}
