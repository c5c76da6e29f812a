//! Digest scheme used by the "complex" handshake that Flash based clients perform.
//!
//! The 1528 random bytes of C1/S1 are split into a 764 byte key block and a 764 byte digest
//! block, in either order.  The digest block starts with four bytes whose sum (mod 728) gives
//! the offset of a 32 byte HMAC-SHA256 digest of the whole packet minus the digest itself.
//!
//! ```text
//! key-digest:  | time (4) | version (4) | key (764)    | digest (764) |
//! digest-key:  | time (4) | version (4) | digest (764) | key (764)    |
//! ```

use super::errors::HandshakeError;
use super::PACKET_SIZE;
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const DIGEST_LENGTH: usize = 32;

const GENUINE_FMS_TEXT_LENGTH: usize = 36;
const GENUINE_FP_TEXT_LENGTH: usize = 30;

pub const SERVER_KEY: [u8; 68] = [
    b'G', b'e', b'n', b'u', b'i', b'n', b'e', b' ', b'A', b'd', b'o', b'b', b'e', b' ', b'F',
    b'l', b'a', b's', b'h', b' ', b'M', b'e', b'd', b'i', b'a', b' ', b'S', b'e', b'r', b'v',
    b'e', b'r', b' ', b'0', b'0', b'1', // Genuine Adobe Flash Media Server 001
    0xF0, 0xEE, 0xC2, 0x4A, 0x80, 0x68, 0xBE, 0xE8, 0x2E, 0x00, 0xD0, 0xD1, 0x02, 0x9E, 0x7E,
    0x57, 0x6E, 0xEC, 0x5D, 0x2D, 0x29, 0x80, 0x6F, 0xAB, 0x93, 0xB8, 0xE6, 0x36, 0xCF, 0xEB,
    0x31, 0xAE,
];

pub const CLIENT_KEY: [u8; 62] = [
    b'G', b'e', b'n', b'u', b'i', b'n', b'e', b' ', b'A', b'd', b'o', b'b', b'e', b' ', b'F',
    b'l', b'a', b's', b'h', b' ', b'P', b'l', b'a', b'y', b'e', b'r', b' ', b'0', b'0',
    b'1', // Genuine Adobe Flash Player 001
    0xF0, 0xEE, 0xC2, 0x4A, 0x80, 0x68, 0xBE, 0xE8, 0x2E, 0x00, 0xD0, 0xD1, 0x02, 0x9E, 0x7E,
    0x57, 0x6E, 0xEC, 0x5D, 0x2D, 0x29, 0x80, 0x6F, 0xAB, 0x93, 0xB8, 0xE6, 0x36, 0xCF, 0xEB,
    0x31, 0xAE,
];

/// Where the digest block sits inside a C1 or S1 packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestSchema {
    /// Key block first, digest block at offset 772
    KeyDigest,

    /// Digest block first, at offset 8
    DigestKey,
}

impl DigestSchema {
    pub fn digest_offset(self, packet: &[u8; PACKET_SIZE]) -> usize {
        let base = match self {
            DigestSchema::KeyDigest => 772,
            DigestSchema::DigestKey => 8,
        };

        let sum: usize = packet[base..base + 4].iter().map(|x| *x as usize).sum();
        (sum % 728) + base + 4
    }
}

pub fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> Result<[u8; DIGEST_LENGTH], HandshakeError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).map_err(|_| HandshakeError::InvalidDigestKey)?;
    for part in parts {
        mac.update(part);
    }

    let mut digest = [0_u8; DIGEST_LENGTH];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    Ok(digest)
}

/// Digest of a packet with the 32 digest bytes cut out of it
fn packet_digest(key: &[u8], packet: &[u8; PACKET_SIZE], offset: usize) -> Result<[u8; DIGEST_LENGTH], HandshakeError> {
    hmac_sha256(key, &[&packet[..offset], &packet[offset + DIGEST_LENGTH..]])
}

/// Looks for a valid client digest using each schema in turn.  Returns the schema that matched
/// and the digest found in C1, or `None` if the client performed a simple handshake.
pub fn find_client_digest(
    c1: &[u8; PACKET_SIZE],
) -> Result<Option<(DigestSchema, [u8; DIGEST_LENGTH])>, HandshakeError> {
    for schema in &[DigestSchema::KeyDigest, DigestSchema::DigestKey] {
        let offset = schema.digest_offset(c1);
        let expected = packet_digest(&CLIENT_KEY[..GENUINE_FP_TEXT_LENGTH], c1, offset)?;
        if c1[offset..offset + DIGEST_LENGTH] == expected {
            return Ok(Some((*schema, expected)));
        }
    }

    Ok(None)
}

/// Writes the digest into `packet` using the given key, as a client or server would.
pub fn sign_packet(key: &[u8], packet: &mut [u8; PACKET_SIZE], schema: DigestSchema) -> Result<(), HandshakeError> {
    let offset = schema.digest_offset(packet);
    let digest = packet_digest(key, packet, offset)?;
    packet[offset..offset + DIGEST_LENGTH].copy_from_slice(&digest);
    Ok(())
}

pub fn sign_server_packet(s1: &mut [u8; PACKET_SIZE], schema: DigestSchema) -> Result<(), HandshakeError> {
    sign_packet(&SERVER_KEY[..GENUINE_FMS_TEXT_LENGTH], s1, schema)
}

/// The last 32 bytes of S2 are a digest of the rest of S2, keyed by a digest of the client's
/// C1 digest.
pub fn sign_server_response(s2: &mut [u8; PACKET_SIZE], client_digest: &[u8; DIGEST_LENGTH]) -> Result<(), HandshakeError> {
    let key = hmac_sha256(&SERVER_KEY, &[client_digest])?;
    let split = PACKET_SIZE - DIGEST_LENGTH;
    let digest = hmac_sha256(&key, &[&s2[..split]])?;
    s2[split..].copy_from_slice(&digest);
    Ok(())
}

#[cfg(test)]
pub fn sign_client_packet(c1: &mut [u8; PACKET_SIZE], schema: DigestSchema) -> Result<(), HandshakeError> {
    sign_packet(&CLIENT_KEY[..GENUINE_FP_TEXT_LENGTH], c1, schema)
}
