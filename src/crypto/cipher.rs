//! AES-256-GCM envelope encryption bound to key contexts.
//!
//! `encrypt` produces `base64(0x01 ‖ nonce ‖ ciphertext ‖ tag)` under
//! the context-derived subkey, with the version byte authenticated as
//! associated data.  `decrypt` understands both that format and the
//! legacy version-less format written before the migration, which uses
//! the global (default-context) master key with no derivation.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce; a
//! repeated nonce under the same key would break confidentiality, so
//! nonces only ever come from the OS CSPRNG.

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroize;

use crate::errors::{CredCoreError, Result};

use super::envelope::{self, Envelope, VERSION_V1};
use super::keys::KeyContext;
use super::resolver::KeyResolver;

/// Associated data for current-format envelopes: the version byte, so a
/// re-versioned envelope fails authentication.
const V1_AAD: &[u8] = &[VERSION_V1];

/// Envelope encryption service.
///
/// Construct one at startup with a [`KeyResolver`] and pass it by
/// reference to consumers; there is no hidden shared instance.
pub struct EnvelopeCipher {
    resolver: KeyResolver,
}

impl EnvelopeCipher {
    pub fn new(resolver: KeyResolver) -> Self {
        Self { resolver }
    }

    /// Access the resolver, e.g. to `clear()` its memo during rotation.
    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    /// Encrypt a UTF-8 string under the given context.
    ///
    /// Returns the base64-encoded current-format envelope.
    pub fn encrypt(&self, plaintext: &str, context: KeyContext) -> Result<String> {
        let master = self.resolver.resolve(context)?;
        let mut key = master.derive_context_key(context)?;

        let sealed = seal(&key, plaintext.as_bytes(), V1_AAD);
        key.zeroize();
        let (nonce, ciphertext) = sealed?;

        Ok(envelope::to_transport(&envelope::encode_v1(
            &nonce,
            &ciphertext,
        )))
    }

    /// Decrypt an envelope produced by `encrypt` (or by the legacy
    /// writer) under the given context.
    ///
    /// Never returns partial plaintext: any integrity, format, or UTF-8
    /// violation is an error.
    pub fn decrypt(&self, envelope_str: &str, context: KeyContext) -> Result<String> {
        let raw = envelope::from_transport(envelope_str)?;

        match Envelope::parse(&raw)? {
            Envelope::V1 { nonce, ciphertext } => {
                let master = self.resolver.resolve(context)?;
                let mut key = master.derive_context_key(context)?;
                let opened = open(&key, nonce, ciphertext, V1_AAD);
                key.zeroize();

                match opened {
                    Ok(plaintext) => into_utf8(plaintext),
                    Err(original) => {
                        // A legacy nonce may begin with 0x01, in which case
                        // this envelope was never V1 at all.  Retry the whole
                        // buffer as legacy; if that fails too, surface the
                        // original error.
                        match self.open_legacy(&raw) {
                            Ok(plaintext) => into_utf8(plaintext),
                            Err(_) => Err(original),
                        }
                    }
                }
            }
            Envelope::Legacy { nonce, ciphertext } => {
                let master = self.resolver.resolve(KeyContext::Default)?;
                let plaintext = open(master.as_bytes(), nonce, ciphertext, &[])?;
                into_utf8(plaintext)
            }
        }
    }

    /// Encrypt in the legacy version-less format.
    ///
    /// Retained for the migration window so systems that still expect
    /// the old format can read newly written data.  Uses the global
    /// key with no per-context derivation.
    pub fn encrypt_legacy(&self, plaintext: &str) -> Result<String> {
        let master = self.resolver.resolve(KeyContext::Default)?;
        let (nonce, ciphertext) = seal(master.as_bytes(), plaintext.as_bytes(), &[])?;

        Ok(envelope::to_transport(&envelope::encode_legacy(
            &nonce,
            &ciphertext,
        )))
    }

    /// Decrypt a legacy version-less envelope.
    pub fn decrypt_legacy(&self, envelope_str: &str) -> Result<String> {
        let raw = envelope::from_transport(envelope_str)?;
        into_utf8(self.open_legacy(&raw)?)
    }

    /// Interpret raw bytes as a legacy envelope and open it with the
    /// global key.
    fn open_legacy(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let (nonce, ciphertext) = envelope::split_legacy(raw)?;
        let master = self.resolver.resolve(KeyContext::Default)?;
        open(master.as_bytes(), nonce, ciphertext, &[])
    }
}

/// Encrypt and authenticate `plaintext` with a 32-byte key, returning
/// (nonce, ciphertext-with-tag).
fn seal(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CredCoreError::EncryptFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| CredCoreError::EncryptFailed(format!("encryption error: {e}")))?;

    Ok((nonce.to_vec(), ciphertext))
}

/// Decrypt and verify the auth tag.  All failures collapse to
/// `DecryptFailed` — callers must not learn whether the key, the tag,
/// or the data was at fault.
fn open(key: &[u8], nonce: &[u8], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CredCoreError::DecryptFailed)?;

    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| CredCoreError::DecryptFailed)
}

/// Convert decrypted bytes to a String, wiping them on failure.
fn into_utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        CredCoreError::DecryptFailed
    })
}
