//! Versioned binary envelope for encrypted values.
//!
//! A current-format envelope has this layout (base64-encoded for
//! storage and transport):
//!
//! ```text
//! [version: 1 byte = 0x01][nonce: 12 bytes][ciphertext][auth tag: 16 bytes]
//! ```
//!
//! Envelopes written before the format was versioned omit the version
//! byte:
//!
//! ```text
//! [nonce: 12 bytes][ciphertext][auth tag: 16 bytes]
//! ```
//!
//! The two are distinguished by the leading byte: `0x01` is the current
//! version, and a byte in the printable-ASCII range can only be the
//! first nonce byte of a legacy envelope.  Any other leading byte is an
//! unsupported version.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::errors::{CredCoreError, Result};

/// Current envelope format version.
pub const VERSION_V1: u8 = 0x01;

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Minimum length of a current-format envelope (empty plaintext).
const V1_MIN_LEN: usize = 1 + NONCE_LEN + TAG_LEN;

/// Minimum length of a legacy envelope (empty plaintext).
const LEGACY_MIN_LEN: usize = NONCE_LEN + TAG_LEN;

/// A parsed envelope, borrowing from the decoded byte buffer.
///
/// `ciphertext` includes the trailing 16-byte auth tag, matching what
/// the AEAD layer produces and consumes.
#[derive(Debug, PartialEq, Eq)]
pub enum Envelope<'a> {
    /// Current format: version byte, authenticated as associated data.
    V1 {
        nonce: &'a [u8],
        ciphertext: &'a [u8],
    },
    /// Version-less format from before the migration.
    Legacy {
        nonce: &'a [u8],
        ciphertext: &'a [u8],
    },
}

impl<'a> Envelope<'a> {
    /// Parse raw envelope bytes, dispatching on the leading byte.
    ///
    /// Length minimums are enforced here so slicing below can never
    /// panic and the cipher layer never sees a malformed buffer.
    pub fn parse(raw: &'a [u8]) -> Result<Self> {
        let first = *raw
            .first()
            .ok_or_else(|| CredCoreError::InvalidFormat("empty envelope".into()))?;

        match first {
            VERSION_V1 => {
                if raw.len() < V1_MIN_LEN {
                    return Err(CredCoreError::InvalidFormat(format!(
                        "envelope too short: {} bytes, need at least {V1_MIN_LEN}",
                        raw.len()
                    )));
                }
                Ok(Envelope::V1 {
                    nonce: &raw[1..1 + NONCE_LEN],
                    ciphertext: &raw[1 + NONCE_LEN..],
                })
            }
            0x20..=0x7e => {
                let (nonce, ciphertext) = split_legacy(raw)?;
                Ok(Envelope::Legacy { nonce, ciphertext })
            }
            other => Err(CredCoreError::UnsupportedVersion(other)),
        }
    }
}

/// Split raw bytes as a legacy envelope, regardless of the leading byte.
///
/// Used by the explicit legacy decrypt path, and as the fallback when a
/// `0x01`-leading envelope fails authentication (a legacy nonce can
/// begin with `0x01`).
pub fn split_legacy(raw: &[u8]) -> Result<(&[u8], &[u8])> {
    if raw.len() < LEGACY_MIN_LEN {
        return Err(CredCoreError::InvalidFormat(format!(
            "envelope too short: {} bytes, need at least {LEGACY_MIN_LEN}",
            raw.len()
        )));
    }
    Ok((&raw[..NONCE_LEN], &raw[NONCE_LEN..]))
}

/// Assemble a current-format envelope from its parts.
pub fn encode_v1(nonce: &[u8], ciphertext: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + nonce.len() + ciphertext.len());
    out.push(VERSION_V1);
    out.extend_from_slice(nonce);
    out.extend_from_slice(ciphertext);
    out
}

/// Assemble a legacy envelope from its parts.
pub fn encode_legacy(nonce: &[u8], ciphertext: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(nonce.len() + ciphertext.len());
    out.extend_from_slice(nonce);
    out.extend_from_slice(ciphertext);
    out
}

/// Base64-encode an assembled envelope for storage.
pub fn to_transport(raw: &[u8]) -> String {
    BASE64.encode(raw)
}

/// Decode a stored envelope string back to raw bytes.
pub fn from_transport(envelope: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(envelope)
        .map_err(|e| CredCoreError::InvalidFormat(format!("bad base64: {e}")))
}
