use thiserror::Error;

/// All errors that can occur in credcore.
#[derive(Debug, Error)]
pub enum CredCoreError {
    // --- Key resolution errors ---
    #[error("No encryption key configured for context '{0}'")]
    MissingKey(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Envelope errors ---
    #[error("Invalid envelope format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported envelope version byte {0:#04x}")]
    UnsupportedVersion(u8),

    // Deliberately vague: tampering, a wrong key, and corruption all
    // surface the same message so callers cannot build a decryption oracle.
    #[error("Decryption failed — wrong key or corrupted envelope")]
    DecryptFailed,

    #[error("Encryption failed: {0}")]
    EncryptFailed(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for credcore results.
pub type Result<T> = std::result::Result<T, CredCoreError>;
