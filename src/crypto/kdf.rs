//! Passphrase fallback key derivation using PBKDF2-HMAC-SHA256.
//!
//! This path exists only to tolerate human-chosen passphrases in a key
//! source.  Machine-provisioned deployments configure a random 32-byte
//! key (base64 or hex) and never reach this code.  The salt is fixed
//! and application-specific: the derived key must be reproducible from
//! the configured value alone, with nowhere to store a per-deployment
//! salt.  Callers are expected to warn when this branch is taken.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::errors::{CredCoreError, Result};

use super::keys::KEY_LEN;

/// Minimum allowed PBKDF2 iteration count.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Fixed application salt for passphrase-derived keys.
const PASSPHRASE_SALT: &[u8] = b"credcore-passphrase-key-v1";

/// Derive a 32-byte key from an arbitrary-length passphrase.
///
/// Enforces the iteration floor so a config typo cannot silently weaken
/// the KDF.  The same passphrase + iteration count always produces the
/// same key.
pub fn derive_key_from_passphrase(passphrase: &[u8], iterations: u32) -> Result<[u8; KEY_LEN]> {
    if iterations < MIN_ITERATIONS {
        return Err(CredCoreError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {iterations})"
        )));
    }

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(passphrase, PASSPHRASE_SALT, iterations, &mut key);
    Ok(key)
}
