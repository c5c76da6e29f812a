//! Server side of the RTMP handshake.
//!
//! The client opens with C0 (a single version byte) and C1 (1536 bytes).  The server answers
//! with S0, S1 and S2 in one write and then waits for C2, which is read and thrown away.
//!
//! ```text
//! client                          server
//!   | --- C0 + C1 ------------------> |
//!   | <-------------- S0 + S1 + S2 -- |
//!   | --- C2 -----------------------> |
//! ```
//!
//! Flash based clients sign C1 with an HMAC digest (the "complex" handshake) and expect the
//! server to sign S1 and S2 in return.  Everything else gets the simple handshake, where S2
//! is an echo of C1.  Enforcing a time limit on the handshake is up to the caller.

mod digest;
mod errors;

pub use self::digest::DigestSchema;
pub use self::errors::HandshakeError;

use bytes::{Bytes, BytesMut};
use rand::Rng;
use tracing::{debug, trace};

pub const RTMP_VERSION: u8 = 3;
pub const PACKET_SIZE: usize = 1536;

// S1 time is left at zero.  The version field only matters to complex handshake clients.
const SERVER_VERSION: [u8; 4] = [0x0D, 0x0E, 0x0A, 0x0D];

/// Which handshake variant the client performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeKind {
    Simple,
    Complex(DigestSchema),
}

/// The result of feeding bytes into the handshake
#[derive(Debug, PartialEq)]
pub enum HandshakeProgress {
    /// Not enough bytes have arrived for the next handshake packet.  Nothing was consumed.
    NeedMoreData,

    /// These bytes must be sent to the client before calling `advance()` again
    Respond(Bytes),

    /// The handshake has completed.  Any bytes left in the buffer belong to the chunk stream.
    Done,
}

#[derive(Debug, PartialEq, Eq)]
enum Stage {
    WaitingForC0C1,
    WaitingForC2,
    Completed,
}

pub struct Handshake {
    stage: Stage,
    kind: Option<HandshakeKind>,
}

impl Handshake {
    pub fn new() -> Handshake {
        Handshake {
            stage: Stage::WaitingForC0C1,
            kind: None,
        }
    }

    /// The negotiated variant, known once C0 and C1 have been processed
    pub fn kind(&self) -> Option<HandshakeKind> {
        self.kind
    }

    pub fn is_completed(&self) -> bool {
        self.stage == Stage::Completed
    }

    /// Consumes the next complete handshake packet from the front of `buffer`, if one is
    /// present.  Partial packets are left in place so the same buffer can be passed in again
    /// once more bytes have been appended to it.
    pub fn advance(&mut self, buffer: &mut BytesMut) -> Result<HandshakeProgress, HandshakeError> {
        match self.stage {
            Stage::WaitingForC0C1 => {
                if let Some(version) = buffer.first() {
                    if *version != RTMP_VERSION {
                        return Err(HandshakeError::BadVersionId { version: *version });
                    }
                }

                if buffer.len() < 1 + PACKET_SIZE {
                    return Ok(HandshakeProgress::NeedMoreData);
                }

                let c0_c1 = buffer.split_to(1 + PACKET_SIZE);
                let mut c1 = [0_u8; PACKET_SIZE];
                c1.copy_from_slice(&c0_c1[1..]);

                let response = self.create_response(&c1)?;
                self.stage = Stage::WaitingForC2;
                Ok(HandshakeProgress::Respond(response))
            }

            Stage::WaitingForC2 => {
                if buffer.len() < PACKET_SIZE {
                    return Ok(HandshakeProgress::NeedMoreData);
                }

                let _ = buffer.split_to(PACKET_SIZE);
                self.stage = Stage::Completed;
                debug!("Handshake completed ({:?})", self.kind);
                Ok(HandshakeProgress::Done)
            }

            Stage::Completed => Err(HandshakeError::HandshakeAlreadyCompleted),
        }
    }

    fn create_response(&mut self, c1: &[u8; PACKET_SIZE]) -> Result<Bytes, HandshakeError> {
        let mut s1 = [0_u8; PACKET_SIZE];
        let mut s2 = [0_u8; PACKET_SIZE];

        match digest::find_client_digest(c1)? {
            Some((schema, client_digest)) => {
                debug!("Client performed a complex handshake using the {:?} schema", schema);

                rand::thread_rng().fill(&mut s1[8..]);
                s1[4..8].copy_from_slice(&SERVER_VERSION);
                digest::sign_server_packet(&mut s1, schema)?;

                rand::thread_rng().fill(&mut s2[..]);
                digest::sign_server_response(&mut s2, &client_digest)?;

                self.kind = Some(HandshakeKind::Complex(schema));
            }

            None => {
                debug!("Client performed a simple handshake");

                rand::thread_rng().fill(&mut s1[8..]);
                s2.copy_from_slice(c1);

                self.kind = Some(HandshakeKind::Simple);
            }
        }

        let mut response = BytesMut::with_capacity(1 + PACKET_SIZE * 2);
        response.extend_from_slice(&[RTMP_VERSION]);
        response.extend_from_slice(&s1);
        response.extend_from_slice(&s2);

        trace!("Sending S0, S1 and S2 ({} bytes)", response.len());
        Ok(response.freeze())
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Handshake::new()
    }
}

#[cfg(test)]
mod tests {
    use super::digest::{self, DigestSchema, DIGEST_LENGTH, SERVER_KEY};
    use super::*;

    fn simple_c1() -> [u8; PACKET_SIZE] {
        let mut c1 = [0_u8; PACKET_SIZE];
        for (index, byte) in c1.iter_mut().enumerate().skip(8) {
            *byte = (index % 256) as u8;
        }

        c1
    }

    fn complex_c1(schema: DigestSchema) -> [u8; PACKET_SIZE] {
        let mut c1 = [0_u8; PACKET_SIZE];
        rand::thread_rng().fill(&mut c1[8..]);
        c1[4..8].copy_from_slice(&[0x80, 0x00, 0x07, 0x02]);
        digest::sign_client_packet(&mut c1, schema).unwrap();
        c1
    }

    fn c0_c1_buffer(c1: &[u8; PACKET_SIZE]) -> BytesMut {
        let mut buffer = BytesMut::new();
        buffer.extend_from_slice(&[3]);
        buffer.extend_from_slice(c1);
        buffer
    }

    fn unwrap_response(progress: HandshakeProgress) -> Bytes {
        match progress {
            HandshakeProgress::Respond(bytes) => bytes,
            x => panic!("Expected a response, received {:?}", x),
        }
    }

    #[test]
    fn gives_error_on_incoming_c0_with_non_3_version() {
        let mut handshake = Handshake::new();
        let mut buffer = BytesMut::from(&[6_u8][..]);

        match handshake.advance(&mut buffer) {
            Err(HandshakeError::BadVersionId { version: 6 }) => (),
            x => panic!("Expected BadVersionId error, received {:?}", x),
        }
    }

    #[test]
    fn simple_handshake_responds_with_s0_s1_and_echoed_c1() {
        let c1 = simple_c1();
        let mut handshake = Handshake::new();
        let mut buffer = c0_c1_buffer(&c1);

        let response = unwrap_response(handshake.advance(&mut buffer).unwrap());

        assert_eq!(response.len(), 1 + PACKET_SIZE * 2, "Incorrect response length");
        assert_eq!(response[0], 3, "Incorrect S0");
        assert_eq!(&response[5..9], &[0, 0, 0, 0], "S1 zero field was not zeroed");
        assert_eq!(&response[1 + PACKET_SIZE..], &c1[..], "S2 was not an echo of C1");
        assert_eq!(handshake.kind(), Some(HandshakeKind::Simple));
        assert!(buffer.is_empty(), "C0 and C1 were not consumed");
    }

    #[test]
    fn needs_more_data_until_full_c1_arrives_and_consumes_nothing() {
        let c1 = simple_c1();
        let mut handshake = Handshake::new();
        let mut buffer = BytesMut::new();
        buffer.extend_from_slice(&[3]);
        buffer.extend_from_slice(&c1[..1000]);

        assert_eq!(handshake.advance(&mut buffer).unwrap(), HandshakeProgress::NeedMoreData);
        assert_eq!(buffer.len(), 1001, "Partial bytes were consumed");

        buffer.extend_from_slice(&c1[1000..]);
        let response = unwrap_response(handshake.advance(&mut buffer).unwrap());
        assert_eq!(&response[1 + PACKET_SIZE..], &c1[..]);
    }

    #[test]
    fn can_complete_handshake_one_byte_at_a_time() {
        let c1 = simple_c1();
        let mut input = vec![3_u8];
        input.extend_from_slice(&c1);
        input.extend_from_slice(&[7_u8; PACKET_SIZE]);
        input.extend_from_slice(&[1, 2, 3]);

        let mut handshake = Handshake::new();
        let mut buffer = BytesMut::new();
        let mut responses = Vec::new();
        let mut completed_at = None;

        for (index, byte) in input.iter().enumerate() {
            buffer.extend_from_slice(&[*byte]);
            if handshake.is_completed() {
                continue;
            }

            loop {
                match handshake.advance(&mut buffer).unwrap() {
                    HandshakeProgress::NeedMoreData => break,
                    HandshakeProgress::Respond(bytes) => responses.push(bytes),
                    HandshakeProgress::Done => {
                        completed_at = Some(index);
                        break;
                    }
                }
            }
        }

        assert_eq!(responses.len(), 1, "Expected exactly one response");
        assert_eq!(completed_at, Some(PACKET_SIZE * 2), "Completed at the wrong byte");
        assert_eq!(&buffer[..], &[1, 2, 3], "Bytes after C2 were not left in the buffer");
    }

    #[test]
    fn bytes_after_c2_are_left_in_buffer() {
        let mut handshake = Handshake::new();
        let mut buffer = c0_c1_buffer(&simple_c1());
        unwrap_response(handshake.advance(&mut buffer).unwrap());

        buffer.extend_from_slice(&[0_u8; PACKET_SIZE]);
        buffer.extend_from_slice(&[5, 6]);

        assert_eq!(handshake.advance(&mut buffer).unwrap(), HandshakeProgress::Done);
        assert_eq!(&buffer[..], &[5, 6]);
        assert!(handshake.is_completed());
    }

    #[test]
    fn gives_error_when_advanced_after_completion() {
        let mut handshake = Handshake::new();
        let mut buffer = c0_c1_buffer(&simple_c1());
        buffer.extend_from_slice(&[0_u8; PACKET_SIZE]);

        unwrap_response(handshake.advance(&mut buffer).unwrap());
        handshake.advance(&mut buffer).unwrap();

        match handshake.advance(&mut buffer) {
            Err(HandshakeError::HandshakeAlreadyCompleted) => (),
            x => panic!("Expected HandshakeAlreadyCompleted, received {:?}", x),
        }
    }

    #[test]
    fn complex_handshake_signs_s1_and_s2() {
        for schema in &[DigestSchema::KeyDigest, DigestSchema::DigestKey] {
            let c1 = complex_c1(*schema);
            let mut handshake = Handshake::new();
            let mut buffer = c0_c1_buffer(&c1);

            let response = unwrap_response(handshake.advance(&mut buffer).unwrap());
            assert_eq!(handshake.kind(), Some(HandshakeKind::Complex(*schema)));

            let mut s1 = [0_u8; PACKET_SIZE];
            s1.copy_from_slice(&response[1..1 + PACKET_SIZE]);
            let offset = schema.digest_offset(&s1);
            let expected_s1_digest = digest::hmac_sha256(
                &SERVER_KEY[..36],
                &[&s1[..offset], &s1[offset + DIGEST_LENGTH..]],
            )
            .unwrap();
            assert_eq!(&s1[offset..offset + DIGEST_LENGTH], &expected_s1_digest[..], "Bad S1 digest");

            let c1_offset = schema.digest_offset(&c1);
            let key = digest::hmac_sha256(&SERVER_KEY, &[&c1[c1_offset..c1_offset + DIGEST_LENGTH]]).unwrap();
            let s2 = &response[1 + PACKET_SIZE..];
            let expected_s2_digest = digest::hmac_sha256(&key, &[&s2[..PACKET_SIZE - DIGEST_LENGTH]]).unwrap();
            assert_eq!(&s2[PACKET_SIZE - DIGEST_LENGTH..], &expected_s2_digest[..], "Bad S2 digest");
        }
    }
}
