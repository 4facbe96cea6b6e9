//! API key generation.
//!
//! A full key is `np_live_<key_id>_<secret>` (or `np_test_...`): the
//! key id is a short public lookup handle and the secret is the actual
//! credential.  Embedding the key id in the visible key lets the
//! validator find the stored record without a full-table scan; it never
//! authenticates anything by itself.
//!
//! Both tokens are URL-safe unpadded base64 with fixed lengths, so the
//! segments can be extracted by position even though the base64url
//! alphabet contains `_`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;

use super::record::Environment;

/// Random bytes behind the key id (12 base64url chars).
const KEY_ID_BYTES: usize = 9;

/// Random bytes behind the secret segment (32 base64url chars).
const KEY_SECRET_BYTES: usize = 24;

/// Length of the key id in characters.
pub const KEY_ID_LEN: usize = 12;

/// Length of the secret segment in characters.
pub const KEY_SECRET_LEN: usize = 32;

/// The one-time result of issuing a key.
///
/// `full_key` is shown to the caller exactly once and is not
/// retrievable afterwards; only its digest is stored.
#[derive(Debug)]
pub struct IssuedKey {
    pub full_key: String,
    pub key_id: String,
}

/// Generate a new API key for an environment.
///
/// Two calls never return the same key or key id (collision probability
/// over 72 and 192 random bits is negligible).
pub fn generate(environment: Environment) -> IssuedKey {
    let key_id = random_token(KEY_ID_BYTES);
    let secret = random_token(KEY_SECRET_BYTES);

    IssuedKey {
        full_key: format!("{}{}_{}", environment.prefix(), key_id, secret),
        key_id,
    }
}

/// A URL-safe token from `len` OS CSPRNG bytes.
fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
