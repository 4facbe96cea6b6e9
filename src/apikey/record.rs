//! API key records and the validated projection.
//!
//! Persistence lives outside this crate; the storage adapter only needs
//! the shapes defined here.  The plaintext key itself never appears in
//! a record — only its keyed digest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CredCoreError, Result};

/// Which key population a key belongs to, encoded in its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Live,
    Test,
}

impl Environment {
    /// The visible key prefix for this environment.
    pub fn prefix(&self) -> &'static str {
        match self {
            Environment::Live => "np_live_",
            Environment::Test => "np_test_",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Live => "live",
            Environment::Test => "test",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = CredCoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "live" => Ok(Environment::Live),
            "test" => Ok(Environment::Test),
            other => Err(CredCoreError::ConfigError(format!(
                "unknown environment '{other}' — expected live or test"
            ))),
        }
    }
}

/// The principal a key acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum KeyOwner {
    User(Uuid),
    Application(Uuid),
}

/// A stored API key record.
///
/// `key_id` is the public lookup handle embedded in the visible key; it
/// must never authenticate a caller on its own.  `hashed_key` is the
/// keyed digest of the full key — the plaintext is surfaced exactly
/// once, at issuance, and is not recoverable from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub id: Uuid,
    pub owner: KeyOwner,
    pub key_id: String,
    pub hashed_key: String,
    pub display_name: String,
    pub environment: Environment,
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ApiKeyRecord {
    /// Build a fresh record at issuance time: active, unexpired, never
    /// used.
    pub fn new(
        owner: KeyOwner,
        key_id: impl Into<String>,
        hashed_key: impl Into<String>,
        display_name: impl Into<String>,
        environment: Environment,
        permissions: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            key_id: key_id.into(),
            hashed_key: hashed_key.into(),
            display_name: display_name.into(),
            environment,
            permissions,
            expires_at: None,
            last_used_at: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// The transient projection handed to request handling after full
    /// verification.
    pub fn project(&self) -> ValidatedKey {
        ValidatedKey {
            id: self.id,
            owner: self.owner,
            key_id: self.key_id.clone(),
            permissions: self.permissions.clone(),
            environment: self.environment,
        }
    }
}

/// A successfully validated key, stripped to what request handling
/// needs.  Produced only after hash verification; carries no secret
/// material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedKey {
    pub id: Uuid,
    pub owner: KeyOwner,
    pub key_id: String,
    pub permissions: Vec<String>,
    pub environment: Environment,
}
