//! Cryptographic core for credcore.
//!
//! This module provides:
//! - Versioned envelope encoding/parsing (`envelope`)
//! - AES-256-GCM envelope encryption bound to key contexts (`cipher`)
//! - PBKDF2 passphrase fallback derivation (`kdf`)
//! - HKDF-based per-context key derivation (`keys`)
//! - Master key resolution from named configuration sources (`resolver`)

pub mod cipher;
pub mod envelope;
pub mod kdf;
pub mod keys;
pub mod resolver;

// Re-export the most commonly used items so callers can write:
//   use credcore::crypto::{EnvelopeCipher, KeyContext, KeyResolver};
pub use cipher::EnvelopeCipher;
pub use envelope::Envelope;
pub use keys::{derive_context_key, KeyContext, MasterKey};
pub use resolver::KeyResolver;
