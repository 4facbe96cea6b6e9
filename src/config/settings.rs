use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::apikey::ValidationCache;
use crate::crypto::KeyResolver;
use crate::errors::{CredCoreError, Result};

/// Deployment-level configuration, loaded from `credcore.toml`.
///
/// Every field has a sensible default so the core works out-of-the-box
/// without any config file at all.  Key material itself never lives
/// here — keys come from the environment sources the resolver consults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Maximum number of entries in the validation cache (default: 1000).
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Validation cache entry lifetime in seconds (default: 300).
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// PBKDF2 iteration count for the passphrase key fallback
    /// (default: 100 000; the crypto layer enforces this as a floor).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_cache_capacity() -> usize {
    1000
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_kdf_iterations() -> u32 {
    100_000
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
            kdf_iterations: default_kdf_iterations(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    const FILE_NAME: &'static str = "credcore.toml";

    /// Load settings from `<dir>/credcore.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CredCoreError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// The validation cache TTL as a `Duration`.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Build a validation cache with the configured bounds.
    pub fn validation_cache(&self) -> ValidationCache {
        ValidationCache::with_config(self.cache_capacity, self.cache_ttl())
    }

    /// Build a key resolver with the configured KDF iteration count.
    pub fn key_resolver(&self) -> KeyResolver {
        KeyResolver::with_iterations(self.kdf_iterations)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.cache_capacity, 1000);
        assert_eq!(s.cache_ttl_secs, 300);
        assert_eq!(s.kdf_iterations, 100_000);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.cache_capacity, 1000);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r"
cache_capacity = 250
cache_ttl_secs = 60
kdf_iterations = 200000
";
        fs::write(tmp.path().join("credcore.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.cache_capacity, 250);
        assert_eq!(settings.cache_ttl_secs, 60);
        assert_eq!(settings.kdf_iterations, 200_000);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("credcore.toml"), "cache_capacity = 50\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.cache_capacity, 50);
        // Rest should be defaults
        assert_eq!(settings.cache_ttl_secs, 300);
        assert_eq!(settings.kdf_iterations, 100_000);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("credcore.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(result.is_err());
    }

    #[test]
    fn cache_ttl_converts_seconds() {
        let s = Settings {
            cache_ttl_secs: 90,
            ..Settings::default()
        };
        assert_eq!(s.cache_ttl(), Duration::from_secs(90));
    }
}
