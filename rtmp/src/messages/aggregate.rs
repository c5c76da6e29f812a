//! Splitting aggregate messages (type 22) back into the audio and video messages they carry.
//!
//! Each sub-message is framed like an FLV tag:
//!
//! | bytes | field                                     |
//! |-------|-------------------------------------------|
//! | 1     | message type                              |
//! | 3     | payload size                              |
//! | 3     | timestamp, low 24 bits                    |
//! | 1     | timestamp, high 8 bits                    |
//! | 3     | stream id                                 |
//! | size  | payload                                   |
//! | 4     | previous tag size, ignored                |

use crate::cursor::{ByteCursor, CursorError};
use crate::messages::Message;
use thiserror::Error;

const SUB_HEADER_LENGTH: usize = 11;
const TRAILER_LENGTH: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Aggregate sub-message header is truncated")]
    TruncatedHeader,

    #[error("Aggregate sub-message declares {declared} payload bytes but only {available} remain")]
    SizeExceedsRemaining { declared: usize, available: usize },

    #[error("Aggregate sub-message is missing its 4 byte trailer")]
    TruncatedTrailer,
}

impl From<CursorError> for AggregateError {
    fn from(_: CursorError) -> Self {
        AggregateError::TruncatedHeader
    }
}

/// Iterates over the audio and video sub-messages of an aggregate message.
///
/// Sub-message timestamps are rebased onto the aggregate's own timestamp, relative to the first
/// sub-message.  Other sub-message types are skipped.  After the first error the iterator is
/// exhausted.
pub struct AggregateSplitter<'a> {
    aggregate: &'a Message,
    cursor: ByteCursor<'a>,
    base_timestamp: Option<u32>,
    failed: bool,
}

impl<'a> AggregateSplitter<'a> {
    pub fn new(aggregate: &'a Message) -> Self {
        AggregateSplitter {
            aggregate,
            cursor: ByteCursor::new(&aggregate.payload[..]),
            base_timestamp: None,
            failed: false,
        }
    }

    fn read_sub_message(&mut self) -> Result<Message, AggregateError> {
        if !self.cursor.has(SUB_HEADER_LENGTH) {
            return Err(AggregateError::TruncatedHeader);
        }

        let message_type = self.cursor.read_u8()?;
        let size = self.cursor.read_u24()? as usize;
        let low_timestamp = self.cursor.read_u24()?;
        let high_timestamp = self.cursor.read_u8()? as u32;
        let stream_id = self.cursor.read_u24()?;

        let timestamp = ((high_timestamp << 24) | low_timestamp) & 0x7FFF_FFFF;
        let base_timestamp = *self.base_timestamp.get_or_insert(timestamp);

        if size > self.cursor.remaining() {
            return Err(AggregateError::SizeExceedsRemaining {
                declared: size,
                available: self.cursor.remaining(),
            });
        }

        let start = self.cursor.position();
        self.cursor.skip(size)?;

        if self.cursor.skip(TRAILER_LENGTH).is_err() {
            return Err(AggregateError::TruncatedTrailer);
        }

        Ok(Message {
            message_type,
            timestamp: self
                .aggregate
                .timestamp
                .wrapping_add(timestamp.wrapping_sub(base_timestamp)),
            timestamp_delta: timestamp,
            stream_id,
            preferred_chunk_stream_id: self.aggregate.preferred_chunk_stream_id,
            payload: self.aggregate.payload.slice(start..start + size),
        })
    }
}

impl<'a> Iterator for AggregateSplitter<'a> {
    type Item = Result<Message, AggregateError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.failed && !self.cursor.is_empty() {
            match self.read_sub_message() {
                Ok(message) if message.is_audio() || message.is_video() => return Some(Ok(message)),
                Ok(_) => continue,
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::message_type;
    use bytes::{BufMut, Bytes, BytesMut};

    fn write_sub_message(bytes: &mut BytesMut, message_type: u8, timestamp: u32, payload: &[u8]) {
        bytes.put_u8(message_type);
        bytes.put_uint(payload.len() as u64, 3);
        bytes.put_uint((timestamp & 0xFF_FFFF) as u64, 3);
        bytes.put_u8((timestamp >> 24) as u8);
        bytes.put_uint(1, 3);
        bytes.put_slice(payload);
        bytes.put_u32((payload.len() + SUB_HEADER_LENGTH) as u32);
    }

    fn aggregate(timestamp: u32, payload: BytesMut) -> Message {
        Message::new(message_type::AGGREGATE, timestamp, 1, 6, payload.freeze())
    }

    #[test]
    fn sub_message_timestamps_are_rebased_onto_aggregate() {
        let mut payload = BytesMut::new();
        write_sub_message(&mut payload, message_type::VIDEO, 1000, &[1, 2, 3]);
        write_sub_message(&mut payload, message_type::AUDIO, 1040, &[4, 5]);

        let message = aggregate(5000, payload);
        let results = AggregateSplitter::new(&message).collect::<Result<Vec<_>, _>>().unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].timestamp, 5000);
        assert_eq!(results[0].message_type, message_type::VIDEO);
        assert_eq!(&results[0].payload[..], &[1, 2, 3]);
        assert_eq!(results[1].timestamp, 5040);
        assert_eq!(results[1].message_type, message_type::AUDIO);
        assert_eq!(&results[1].payload[..], &[4, 5]);
        assert_eq!(results[1].stream_id, 1);
    }

    #[test]
    fn high_timestamp_byte_is_applied() {
        let mut payload = BytesMut::new();
        write_sub_message(&mut payload, message_type::VIDEO, 0x0100_0010, &[1]);
        write_sub_message(&mut payload, message_type::VIDEO, 0x0100_0020, &[2]);

        let message = aggregate(0, payload);
        let results = AggregateSplitter::new(&message).collect::<Result<Vec<_>, _>>().unwrap();

        assert_eq!(results[0].timestamp_delta, 0x0100_0010);
        assert_eq!(results[1].timestamp, 0x10);
    }

    #[test]
    fn non_media_sub_messages_are_skipped() {
        let mut payload = BytesMut::new();
        write_sub_message(&mut payload, message_type::AMF0_DATA, 0, &[2, 0, 1, 0x61]);
        write_sub_message(&mut payload, message_type::AUDIO, 20, &[9]);

        let message = aggregate(100, payload);
        let results = AggregateSplitter::new(&message).collect::<Result<Vec<_>, _>>().unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].timestamp, 120, "Base time is the first sub-message, even when skipped");
    }

    #[test]
    fn gives_error_when_size_exceeds_remaining_bytes() {
        let mut payload = BytesMut::new();
        write_sub_message(&mut payload, message_type::VIDEO, 0, &[1, 2, 3]);
        payload.put_u8(message_type::VIDEO);
        payload.put_uint(500, 3);
        payload.put_slice(&[0, 0, 0, 0, 0, 0, 1, 5, 5]);

        let message = aggregate(0, payload);
        let mut splitter = AggregateSplitter::new(&message);

        assert!(splitter.next().unwrap().is_ok());
        assert_eq!(
            splitter.next(),
            Some(Err(AggregateError::SizeExceedsRemaining {
                declared: 500,
                available: 2
            }))
        );
        assert_eq!(splitter.next(), None);
    }

    #[test]
    fn gives_error_on_truncated_trailer() {
        let mut payload = BytesMut::new();
        write_sub_message(&mut payload, message_type::VIDEO, 0, &[1, 2, 3]);
        payload.truncate(payload.len() - 2);

        let message = aggregate(0, payload);
        let mut splitter = AggregateSplitter::new(&message);

        assert_eq!(splitter.next(), Some(Err(AggregateError::TruncatedTrailer)));
    }

    #[test]
    fn gives_error_on_truncated_header() {
        let message = Message::new(message_type::AGGREGATE, 0, 1, 6, Bytes::from(vec![9, 0, 0]));
        let mut splitter = AggregateSplitter::new(&message);

        assert_eq!(splitter.next(), Some(Err(AggregateError::TruncatedHeader)));
    }

    #[test]
    fn empty_aggregate_yields_nothing() {
        let message = Message::new(message_type::AGGREGATE, 0, 1, 6, Bytes::new());
        assert_eq!(AggregateSplitter::new(&message).count(), 0);
    }
}
