//! Per-context key derivation using HKDF-SHA256.
//!
//! From a single master key we derive a unique subkey for each
//! [`KeyContext`], so ciphertext written for one purpose can never be
//! decrypted with the key of another purpose, even when both purposes
//! share a master key.
//!
//! HKDF (RFC 5869) uses the master key as input keying material (IKM)
//! and a context string (`info`) to produce independent sub-keys.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::errors::{CredCoreError, Result};

/// Length of master and derived keys (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Purpose tag for encrypted data.
///
/// Each context gets its own derived subkey and its own ordered list of
/// key sources. Adding a context is a code change on purpose: an
/// unrecognized context must fail loudly rather than silently fall back
/// to a shared key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyContext {
    /// Third-party payment-rail provider credentials.
    ApiCredentials,
    /// Per-user secrets (e.g. linked-account tokens).
    UserSecrets,
    /// Internal service-to-service secrets.
    Internal,
    /// Everything that predates context separation.
    Default,
}

impl KeyContext {
    /// Stable string form, used as the HKDF info suffix and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyContext::ApiCredentials => "api-credentials",
            KeyContext::UserSecrets => "user-secrets",
            KeyContext::Internal => "internal",
            KeyContext::Default => "default",
        }
    }
}

impl std::fmt::Display for KeyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KeyContext {
    type Err = CredCoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "api-credentials" => Ok(KeyContext::ApiCredentials),
            "user-secrets" => Ok(KeyContext::UserSecrets),
            "internal" => Ok(KeyContext::Internal),
            "default" => Ok(KeyContext::Default),
            other => Err(CredCoreError::ConfigError(format!(
                "unknown key context '{other}' — expected api-credentials, user-secrets, internal, or default"
            ))),
        }
    }
}

/// Derive the per-context encryption key from a master key.
///
/// `info` is set to `"credcore-context:<context>"` to bind the derived
/// key to a single purpose.  Deterministic: same (master, context)
/// always yields the same subkey.
pub fn derive_context_key(master_key: &[u8], context: KeyContext) -> Result<[u8; KEY_LEN]> {
    let info = format!("credcore-context:{context}");
    hkdf_derive(master_key, info.as_bytes())
}

/// Internal helper: run HKDF-SHA256 expand with the given `info`.
///
/// We skip the `extract` step and use the master key directly as the
/// pseudo-random key (PRK): resolved master keys are already uniform
/// (random 32-byte values, or the output of PBKDF2 for the passphrase
/// fallback).
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| CredCoreError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A wrapper around a 32-byte master key that automatically zeroes
/// its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. for the legacy global-key path).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the per-context encryption key from this master key.
    pub fn derive_context_key(&self, context: KeyContext) -> Result<[u8; KEY_LEN]> {
        derive_context_key(&self.bytes, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn different_contexts_produce_different_keys() {
        let master = [0x99u8; KEY_LEN];

        let key_a = derive_context_key(&master, KeyContext::ApiCredentials).expect("derive A");
        let key_b = derive_context_key(&master, KeyContext::UserSecrets).expect("derive B");

        assert_ne!(key_a, key_b, "contexts must yield unrelated subkeys");
    }

    #[test]
    fn same_context_produces_same_key() {
        let master = [0x77u8; KEY_LEN];

        let key1 = derive_context_key(&master, KeyContext::Internal).expect("derive 1");
        let key2 = derive_context_key(&master, KeyContext::Internal).expect("derive 2");

        assert_eq!(key1, key2, "derivation must be deterministic");
    }

    #[test]
    fn different_masters_produce_different_keys() {
        let key1 = derive_context_key(&[0x11u8; KEY_LEN], KeyContext::Default).expect("derive 1");
        let key2 = derive_context_key(&[0x22u8; KEY_LEN], KeyContext::Default).expect("derive 2");

        assert_ne!(key1, key2);
    }

    #[test]
    fn master_key_wrapper_matches_free_function() {
        let raw = [0x44u8; KEY_LEN];
        let mk = MasterKey::new(raw);

        let via_wrapper = mk
            .derive_context_key(KeyContext::ApiCredentials)
            .expect("wrapper derive");
        let via_fn = derive_context_key(&raw, KeyContext::ApiCredentials).expect("fn derive");
        assert_eq!(via_wrapper, via_fn);
    }

    #[test]
    fn context_round_trips_through_str() {
        for ctx in [
            KeyContext::ApiCredentials,
            KeyContext::UserSecrets,
            KeyContext::Internal,
            KeyContext::Default,
        ] {
            let parsed: KeyContext = ctx.as_str().parse().expect("parse");
            assert_eq!(parsed, ctx);
        }
        assert!("payments".parse::<KeyContext>().is_err());
    }
}
