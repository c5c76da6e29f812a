use super::chunk_header::{read_basic_header, ChunkHeader, ChunkHeaderFormat, MAX_TIMESTAMP_FIELD};
use super::{ChunkDeserializationError, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::cursor::{ByteCursor, CursorError};
use crate::messages::Message;
use bytes::{Buf, BytesMut};
use std::cmp::min;
use std::collections::{HashMap, VecDeque};
use tracing::{trace, warn};

const TIMESTAMP_MASK: u32 = 0x7FFF_FFFF;

/// What a call to `ChunkDeserializer::read()` accomplished
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ReadStatus {
    /// The buffer does not hold a complete chunk.  Nothing was consumed.
    NeedMoreData,

    /// One chunk was consumed but its message still needs more chunks
    ChunkConsumed,

    /// One chunk was consumed and it completed a message, available from `take_message()`
    MessageReady,
}

/// Per chunk stream state.  Lives as long as the connection.
struct ChunkStream {
    header: ChunkHeader,

    /// The last timestamp field seen was 0xFFFFFF, so type 3 chunks carry an extended
    /// timestamp as well
    has_extended_timestamp: bool,

    payload: BytesMut,
}

/// Header fields of one chunk, parsed without touching any state
struct ParsedChunk<'a> {
    format: ChunkHeaderFormat,
    csid: u32,
    timestamp_field: Option<u32>,
    message_length: Option<u32>,
    message_type_id: Option<u8>,
    message_stream_id: Option<u32>,
    extended_timestamp: Option<u32>,
    data: &'a [u8],
}

enum ParseFailure {
    Incomplete,
    Invalid(ChunkDeserializationError),
}

impl From<CursorError> for ParseFailure {
    fn from(_: CursorError) -> Self {
        ParseFailure::Incomplete
    }
}

impl From<ChunkDeserializationError> for ParseFailure {
    fn from(error: ChunkDeserializationError) -> Self {
        ParseFailure::Invalid(error)
    }
}

/// Allows deserializing bytes representing RTMP chunks into RTMP messages.
///
/// Due to the nature of the RTMP chunk protocol it is required that every byte going through
/// the wire is sent to the same `ChunkDeserializer` instance, as future chunks can rely on
/// previous chunks, so any chunks missing from the stream may cause deserialization errors.
///
/// The deserializer never holds on to raw bytes itself.  It reads chunks off the front of a
/// buffer owned by the caller and only consumes a chunk once the whole chunk (header and its
/// slice of payload) is present, so the caller can keep appending to the same buffer as bytes
/// arrive in any fragmentation.
pub struct ChunkDeserializer {
    max_chunk_size: usize,
    chunk_streams: HashMap<u32, ChunkStream>,
    ready_messages: VecDeque<Message>,
}

impl ChunkDeserializer {
    /// Create a new `ChunkDeserializer` with its initial properties.
    ///
    /// Per the RTMP specification an initial `ChunkDeserializer` is expecting RTMP chunks with
    /// a max size of 128 bytes.
    pub fn new() -> ChunkDeserializer {
        ChunkDeserializer {
            max_chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_streams: HashMap::new(),
            ready_messages: VecDeque::new(),
        }
    }

    /// Reads at most one chunk from the front of `buffer`.
    ///
    /// When the buffer holds less than a full chunk `ReadStatus::NeedMoreData` is returned and
    /// the buffer is left untouched.  Any error is a protocol violation by the peer and the
    /// connection should be dropped.
    pub fn read(&mut self, buffer: &mut BytesMut) -> Result<ReadStatus, ChunkDeserializationError> {
        let mut cursor = ByteCursor::new(&buffer[..]);
        let chunk = match self.parse_chunk(&mut cursor) {
            Ok(chunk) => chunk,
            Err(ParseFailure::Incomplete) => return Ok(ReadStatus::NeedMoreData),
            Err(ParseFailure::Invalid(error)) => return Err(error),
        };

        let consumed = cursor.position();
        let completed = self.apply_chunk(chunk);
        buffer.advance(consumed);

        if completed {
            Ok(ReadStatus::MessageReady)
        } else {
            Ok(ReadStatus::ChunkConsumed)
        }
    }

    pub fn message_ready(&self) -> bool {
        !self.ready_messages.is_empty()
    }

    /// Hands over the oldest completed message
    pub fn take_message(&mut self) -> Option<Message> {
        self.ready_messages.pop_front()
    }

    /// Reads chunks from `buffer` until a message completes or more bytes are needed.
    ///
    /// ## Examples
    ///
    /// ```
    /// use bytes::{Bytes, BytesMut};
    /// use lms_rtmp::chunk_io::{ChunkDeserializer, ChunkSerializer};
    /// use lms_rtmp::messages::Message;
    ///
    /// let input1 = Message::new(9, 55, 1, 6, Bytes::from(vec![1, 2, 3, 4, 5, 6]));
    /// let input2 = Message::new(9, 65, 1, 6, Bytes::from(vec![8, 9, 10]));
    ///
    /// let serializer = ChunkSerializer::new();
    /// let mut buffer = BytesMut::new();
    /// buffer.extend_from_slice(&serializer.serialize(&input1).unwrap());
    /// buffer.extend_from_slice(&serializer.serialize(&input2).unwrap());
    ///
    /// let mut deserializer = ChunkDeserializer::new();
    /// assert_eq!(deserializer.get_next_message(&mut buffer).unwrap(), Some(input1));
    /// assert_eq!(deserializer.get_next_message(&mut buffer).unwrap(), Some(input2));
    /// assert_eq!(deserializer.get_next_message(&mut buffer).unwrap(), None);
    /// ```
    pub fn get_next_message(&mut self, buffer: &mut BytesMut) -> Result<Option<Message>, ChunkDeserializationError> {
        loop {
            if let Some(message) = self.take_message() {
                return Ok(Some(message));
            }

            if self.read(buffer)? == ReadStatus::NeedMoreData {
                return Ok(None);
            }
        }
    }

    /// Tells the deserializer that the peer will start sending RTMP chunks with a different
    /// max chunk size.
    ///
    /// The sender and the receiver must agree exactly on the max chunk size, so this should
    /// only be called in reaction to a `SetChunkSize` message from the peer, before any chunk
    /// that follows that message is read.
    pub fn set_max_chunk_size(&mut self, new_size: usize) -> Result<(), ChunkDeserializationError> {
        if new_size == 0 || new_size > MAX_CHUNK_SIZE {
            return Err(ChunkDeserializationError::InvalidMaxChunkSize { chunk_size: new_size });
        }

        self.max_chunk_size = new_size;
        Ok(())
    }

    /// Returns the maximum size of any RTMP chunks that should be received
    pub fn get_max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Drops the partially received message on a chunk stream, as asked for by an Abort
    /// message.  The chunk stream's last header is kept.
    pub fn abort(&mut self, csid: u32) {
        if let Some(stream) = self.chunk_streams.get_mut(&csid) {
            trace!("Discarding {} partial bytes on csid {}", stream.payload.len(), csid);
            stream.payload.clear();
        }
    }

    fn parse_chunk<'a>(&self, cursor: &mut ByteCursor<'a>) -> Result<ParsedChunk<'a>, ParseFailure> {
        let (format, csid) = read_basic_header(cursor)?;
        let previous = self.chunk_streams.get(&csid);
        let received = previous.map_or(0, |stream| stream.payload.len());

        match (format, previous) {
            (ChunkHeaderFormat::TimeDeltaOnly, None) | (ChunkHeaderFormat::Empty, None) => {
                return Err(ChunkDeserializationError::NoPreviousChunkOnStream {
                    csid,
                    format: format_id(format),
                }
                .into());
            }

            (ChunkHeaderFormat::Full, Some(stream)) if received > 0 => {
                return Err(ChunkDeserializationError::PreviousMessageIncomplete {
                    csid,
                    received,
                    expected: stream.header.message_length as usize,
                }
                .into());
            }

            _ => (),
        }

        let mut chunk = ParsedChunk {
            format,
            csid,
            timestamp_field: None,
            message_length: None,
            message_type_id: None,
            message_stream_id: None,
            extended_timestamp: None,
            data: &[],
        };

        if format != ChunkHeaderFormat::Empty {
            chunk.timestamp_field = Some(cursor.read_u24()?);
        }

        if format == ChunkHeaderFormat::Full || format == ChunkHeaderFormat::TimeDeltaWithoutMessageStreamId {
            chunk.message_length = Some(cursor.read_u24()?);
            chunk.message_type_id = Some(cursor.read_u8()?);
        }

        if format == ChunkHeaderFormat::Full {
            chunk.message_stream_id = Some(cursor.read_u32_le()?);
        }

        let has_extended_timestamp = match chunk.timestamp_field {
            Some(field) => field == MAX_TIMESTAMP_FIELD,
            None => previous.map_or(false, |stream| stream.has_extended_timestamp),
        };

        if has_extended_timestamp {
            chunk.extended_timestamp = Some(cursor.read_u32()?);
        }

        let message_length = match (chunk.message_length, previous) {
            (Some(length), Some(stream)) if received > 0 && length != stream.header.message_length => {
                return Err(ChunkDeserializationError::MessageLengthChanged {
                    csid,
                    previous: stream.header.message_length,
                    new: length,
                }
                .into());
            }

            (Some(length), _) => length as usize,
            (None, Some(stream)) => stream.header.message_length as usize,
            (None, None) => 0,
        };

        let slice_length = min(message_length - received, self.max_chunk_size);
        chunk.data = cursor.read_bytes(slice_length)?;

        Ok(chunk)
    }

    /// Commits a fully parsed chunk to its chunk stream.  Returns true if it completed a message.
    fn apply_chunk(&mut self, chunk: ParsedChunk) -> bool {
        let csid = chunk.csid;
        let stream = self.chunk_streams.entry(csid).or_insert_with(|| {
            if chunk.format != ChunkHeaderFormat::Full {
                warn!("Fresh chunk stream {} started with a type 1 header", csid);
            }

            ChunkStream {
                header: ChunkHeader::default(),
                has_extended_timestamp: false,
                payload: BytesMut::new(),
            }
        });

        let starts_message = stream.payload.is_empty();
        if let Some(field) = chunk.timestamp_field {
            stream.has_extended_timestamp = field == MAX_TIMESTAMP_FIELD;
        }

        let header = &mut stream.header;
        if let Some(length) = chunk.message_length {
            header.message_length = length;
        }

        if let Some(type_id) = chunk.message_type_id {
            header.message_type_id = type_id;
        }

        if let Some(stream_id) = chunk.message_stream_id {
            header.message_stream_id = stream_id;
        }

        let timestamp_value = chunk.extended_timestamp.or(chunk.timestamp_field);
        if chunk.format == ChunkHeaderFormat::Full {
            if let Some(timestamp) = timestamp_value {
                header.timestamp = timestamp & TIMESTAMP_MASK;
                header.timestamp_delta = timestamp;
            }
        } else if starts_message {
            // Continuation chunks of a message must not apply the delta again, only the
            // chunk that starts a message does.
            if let Some(delta) = timestamp_value {
                header.timestamp_delta = delta;
            }

            header.timestamp = header.timestamp.wrapping_add(header.timestamp_delta) & TIMESTAMP_MASK;
        }

        if starts_message {
            stream.payload.reserve(header.message_length as usize);
        }

        stream.payload.extend_from_slice(chunk.data);
        trace!(
            "Read chunk on csid {} ({:?}): {} of {} bytes",
            csid,
            chunk.format,
            stream.payload.len(),
            header.message_length
        );

        if stream.payload.len() < header.message_length as usize {
            return false;
        }

        let message = Message {
            message_type: header.message_type_id,
            timestamp: header.timestamp,
            timestamp_delta: header.timestamp_delta,
            stream_id: header.message_stream_id,
            preferred_chunk_stream_id: csid,
            payload: stream.payload.split().freeze(),
        };

        self.ready_messages.push_back(message);
        true
    }
}

impl Default for ChunkDeserializer {
    fn default() -> Self {
        ChunkDeserializer::new()
    }
}

fn format_id(format: ChunkHeaderFormat) -> u8 {
    match format {
        ChunkHeaderFormat::Full => 0,
        ChunkHeaderFormat::TimeDeltaWithoutMessageStreamId => 1,
        ChunkHeaderFormat::TimeDeltaOnly => 2,
        ChunkHeaderFormat::Empty => 3,
    }
}
