//! Keyed hashing of full API keys.
//!
//! Keys are stored as `HMAC-SHA256(hash_key, full_key)` in hex.  The
//! hash key is a server-side secret distinct from every encryption key,
//! so a leaked digest store cannot be attacked with precomputed tables
//! and a leaked encryption key reveals nothing about key digests.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::errors::{CredCoreError, Result};

/// Environment variable holding the server-side hash key.
const HASH_KEY_SOURCE: &str = "NP_API_KEY_HASH_KEY";

/// Computes irreversible digests of full API keys.
pub struct ApiKeyHasher {
    /// HMAC instance keyed at construction; cloned per hash so the raw
    /// key bytes are not kept around.
    mac: Hmac<Sha256>,
}

impl ApiKeyHasher {
    /// Create a hasher from raw hash-key bytes.
    pub fn new(hash_key: &[u8]) -> Result<Self> {
        let mac = Hmac::<Sha256>::new_from_slice(hash_key)
            .map_err(|e| CredCoreError::KeyDerivationFailed(format!("HMAC init failed: {e}")))?;
        Ok(Self { mac })
    }

    /// Create a hasher from the `NP_API_KEY_HASH_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let mut value = std::env::var(HASH_KEY_SOURCE)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CredCoreError::MissingKey("api-key-hash".to_string()))?;

        let hasher = Self::new(value.as_bytes());
        value.zeroize();
        hasher
    }

    /// Compute the storage digest of a full key (hex, 64 chars).
    pub fn hash(&self, full_key: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(full_key.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Constant-time digest comparison.
///
/// Both branches perform a comparison of the same cost: when lengths
/// differ the candidate is compared against itself before rejecting, so
/// timing does not reveal the stored digest's length.
pub fn digest_matches(candidate: &str, stored: &str) -> bool {
    let a = candidate.as_bytes();
    let b = stored.as_bytes();

    if a.len() != b.len() {
        let _ = a.ct_eq(a);
        return false;
    }
    a.ct_eq(b).into()
}
