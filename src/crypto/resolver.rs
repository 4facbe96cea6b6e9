//! Master key resolution from named environment sources.
//!
//! Each [`KeyContext`] consults an ordered list of environment
//! variables: a context-specific variable first, then the shared
//! `NP_ENCRYPTION_KEY` fallback.  The first non-empty value wins.  A
//! context with no configured source is a hard error — silently
//! sharing a key between contexts would defeat per-context key
//! isolation.
//!
//! Raw values are normalized to a 32-byte key (base64, then hex, then
//! raw bytes, then the passphrase KDF as a last resort) and memoized
//! for the life of the resolver.  `clear()` drops the memo during key
//! rotation.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::RwLock;
use zeroize::Zeroize;

use crate::errors::{CredCoreError, Result};

use super::kdf;
use super::keys::{KeyContext, MasterKey, KEY_LEN};

/// Shared fallback source consulted by every context.
const SHARED_KEY_SOURCE: &str = "NP_ENCRYPTION_KEY";

/// Ordered key sources for a context, most specific first.
fn key_sources(context: KeyContext) -> &'static [&'static str] {
    match context {
        KeyContext::ApiCredentials => &["NP_API_CREDENTIALS_ENCRYPTION_KEY", SHARED_KEY_SOURCE],
        KeyContext::UserSecrets => &["NP_USER_SECRETS_ENCRYPTION_KEY", SHARED_KEY_SOURCE],
        KeyContext::Internal => &["NP_INTERNAL_ENCRYPTION_KEY", SHARED_KEY_SOURCE],
        KeyContext::Default => &[SHARED_KEY_SOURCE],
    }
}

/// Resolves and memoizes master keys per context.
///
/// Construct one at startup and hand it to the components that need
/// keys — there is deliberately no process-global instance, so tests
/// and rotation tooling can hold their own.
pub struct KeyResolver {
    /// PBKDF2 iteration count for the passphrase fallback.
    iterations: u32,

    /// Per-context memo of normalized keys.  First resolution may race;
    /// last writer wins, which is harmless because normalization is
    /// deterministic for a given source value.
    memo: RwLock<HashMap<KeyContext, [u8; KEY_LEN]>>,
}

impl KeyResolver {
    /// Create a resolver with the default KDF iteration count.
    pub fn new() -> Self {
        Self::with_iterations(kdf::DEFAULT_ITERATIONS)
    }

    /// Create a resolver with an explicit KDF iteration count
    /// (floor-enforced when the passphrase branch is actually taken).
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            memo: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the master key for a context.
    ///
    /// Fails with [`CredCoreError::MissingKey`] when no configured
    /// source yields a value.
    pub fn resolve(&self, context: KeyContext) -> Result<MasterKey> {
        if let Some(key) = self.memo.read().get(&context) {
            return Ok(MasterKey::new(*key));
        }

        let mut raw = lookup_source(context)?;
        let key = normalize_key(&raw, context, self.iterations);
        raw.zeroize();
        let key = key?;

        self.memo.write().insert(context, key);
        Ok(MasterKey::new(key))
    }

    /// Drop all memoized keys (used during key rotation).
    pub fn clear(&self) {
        let mut memo = self.memo.write();
        for key in memo.values_mut() {
            key.zeroize();
        }
        memo.clear();
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk a context's sources in order and return the first non-empty
/// value.
fn lookup_source(context: KeyContext) -> Result<String> {
    for &var in key_sources(context) {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }
    Err(CredCoreError::MissingKey(context.as_str().to_string()))
}

/// Normalize a raw configured value to a 32-byte key.
///
/// Policy, first match wins:
/// 1. base64 decoding to at least 32 bytes (truncated to 32);
/// 2. hex decoding with the same length rule;
/// 3. the raw UTF-8 bytes, when exactly 32;
/// 4. PBKDF2 over the value as a passphrase.
///
/// The passphrase branch tolerates human-chosen values and is logged as
/// deprecated — production keys should be random and full-length.
pub(crate) fn normalize_key(
    raw: &str,
    context: KeyContext,
    iterations: u32,
) -> Result<[u8; KEY_LEN]> {
    if let Ok(mut decoded) = BASE64.decode(raw) {
        if decoded.len() >= KEY_LEN {
            let mut key = [0u8; KEY_LEN];
            key.copy_from_slice(&decoded[..KEY_LEN]);
            decoded.zeroize();
            return Ok(key);
        }
        decoded.zeroize();
    }

    if let Ok(mut decoded) = hex::decode(raw) {
        if decoded.len() >= KEY_LEN {
            let mut key = [0u8; KEY_LEN];
            key.copy_from_slice(&decoded[..KEY_LEN]);
            decoded.zeroize();
            return Ok(key);
        }
        decoded.zeroize();
    }

    let bytes = raw.as_bytes();
    if bytes.len() == KEY_LEN {
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(bytes);
        return Ok(key);
    }

    tracing::warn!(
        context = context.as_str(),
        "encryption key is being derived from a passphrase — configure a random 32-byte key (base64 or hex) instead"
    );
    kdf::derive_key_from_passphrase(bytes, iterations)
}
