//! API key validation.
//!
//! Checks run cheapest-first and short-circuit: format, cache, key-id
//! equality, active flag, expiry, and only then the keyed digest
//! comparison.  Every failure returns `None` — callers never learn
//! *why* a key was rejected, which keeps the validator useless as an
//! enumeration oracle.  Reasons are logged server-side with masked
//! previews only.

use std::sync::Arc;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;

use crate::errors::Result;

use super::cache::ValidationCache;
use super::hasher::{digest_matches, ApiKeyHasher};
use super::mask_key;
use super::record::{ApiKeyRecord, Environment, ValidatedKey};

static KEY_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Full key shape: prefix, 12-char key id, 32-char secret.
fn key_pattern() -> &'static Regex {
    KEY_PATTERN.get_or_init(|| {
        Regex::new(r"^np_(live|test)_([A-Za-z0-9_-]{12})_([A-Za-z0-9_-]{32})$")
            .expect("static key pattern compiles")
    })
}

/// Split a presented key into its environment and public key id.
///
/// Returns `None` for anything that is not shaped like one of our keys.
pub fn parse_key(full_key: &str) -> Option<(Environment, &str)> {
    let captures = key_pattern().captures(full_key)?;

    let environment = match captures.get(1)?.as_str() {
        "live" => Environment::Live,
        _ => Environment::Test,
    };
    Some((environment, captures.get(2)?.as_str()))
}

/// Deferred storage access for the async validation path.
///
/// Implemented by the storage adapter; this crate never talks to a
/// database itself.
#[async_trait]
pub trait ApiKeyLookup: Send + Sync {
    /// Fetch a record by its public key id.  `Ok(None)` means the id is
    /// unknown.
    async fn find_by_key_id(&self, key_id: &str) -> Result<Option<ApiKeyRecord>>;

    /// Record a successful use of the key.  Runs on a detached task;
    /// failures are logged and never affect the validation result.
    async fn mark_used(&self, _key_id: &str) -> Result<()> {
        Ok(())
    }
}

/// Verifies presented keys against stored records.
pub struct ApiKeyValidator {
    hasher: ApiKeyHasher,
    cache: Arc<ValidationCache>,
}

impl ApiKeyValidator {
    pub fn new(hasher: ApiKeyHasher, cache: Arc<ValidationCache>) -> Self {
        Self { hasher, cache }
    }

    /// The validation cache, for explicit invalidation on revocation.
    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    /// Validate a presented key against its stored record.
    ///
    /// Returns the validated projection, or `None` on any failure.
    pub fn validate(&self, full_key: &str, record: &ApiKeyRecord) -> Option<ValidatedKey> {
        let (_, key_id) = parse_key(full_key)?;

        if let Some(hit) = self.cache.get(full_key) {
            return Some(hit);
        }

        if key_id != record.key_id {
            tracing::debug!(
                key = %mask_key(full_key),
                key_id = %record.key_id,
                "api key id does not match record"
            );
            return None;
        }

        if !record.is_active {
            tracing::warn!(key_id = %record.key_id, "rejected deactivated api key");
            return None;
        }

        if let Some(expires_at) = record.expires_at {
            if expires_at <= Utc::now() {
                tracing::warn!(key_id = %record.key_id, "rejected expired api key");
                return None;
            }
        }

        let digest = self.hasher.hash(full_key);
        if !digest_matches(&digest, &record.hashed_key) {
            tracing::warn!(
                key = %mask_key(full_key),
                key_id = %record.key_id,
                "api key digest mismatch"
            );
            return None;
        }

        let validated = record.project();
        self.cache.set(full_key, validated.clone());
        Some(validated)
    }

    /// Validate with deferred storage access.
    ///
    /// The cache is consulted before the lookup runs, so hot keys skip
    /// storage entirely.  On success, `mark_used` fires on a detached
    /// task — the caller's result never waits on it.
    pub async fn validate_with_lookup(
        &self,
        full_key: &str,
        lookup: Arc<dyn ApiKeyLookup>,
    ) -> Option<ValidatedKey> {
        let (_, key_id) = parse_key(full_key)?;

        if let Some(hit) = self.cache.get(full_key) {
            spawn_mark_used(lookup, hit.key_id.clone());
            return Some(hit);
        }

        let record = match lookup.find_by_key_id(key_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!(key = %mask_key(full_key), "api key id not found");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %mask_key(full_key), error = %e, "api key lookup failed");
                return None;
            }
        };

        let validated = self.validate(full_key, &record)?;
        spawn_mark_used(lookup, validated.key_id.clone());
        Some(validated)
    }
}

/// Fire-and-forget usage tracking.
fn spawn_mark_used(lookup: Arc<dyn ApiKeyLookup>, key_id: String) {
    tokio::spawn(async move {
        if let Err(e) = lookup.mark_used(&key_id).await {
            tracing::warn!(key_id = %key_id, error = %e, "failed to record api key usage");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apikey::generator;
    use crate::apikey::record::KeyOwner;
    use uuid::Uuid;

    fn validator() -> ApiKeyValidator {
        ApiKeyValidator::new(
            ApiKeyHasher::new(b"unit-test-hash-key").expect("hasher"),
            Arc::new(ValidationCache::new()),
        )
    }

    fn issue(validator: &ApiKeyValidator, environment: Environment) -> (String, ApiKeyRecord) {
        let issued = generator::generate(environment);
        let record = ApiKeyRecord::new(
            KeyOwner::Application(Uuid::new_v4()),
            issued.key_id.clone(),
            validator.hasher.hash(&issued.full_key),
            "unit test key",
            environment,
            vec![],
        );
        (issued.full_key, record)
    }

    #[test]
    fn fresh_key_validates() {
        let v = validator();
        let (full_key, record) = issue(&v, Environment::Live);

        let validated = v.validate(&full_key, &record).expect("valid");
        assert_eq!(validated.key_id, record.key_id);
    }

    #[test]
    fn unrecognized_prefix_is_rejected() {
        let v = validator();
        let (full_key, record) = issue(&v, Environment::Live);

        let foreign = full_key.replacen("np_live_", "xx_live_", 1);
        assert!(v.validate(&foreign, &record).is_none());
    }

    #[test]
    fn mutated_key_fails() {
        let v = validator();
        let (full_key, record) = issue(&v, Environment::Live);

        // Flip the final character to another alphabet member.
        let mut mutated = full_key.clone();
        let last = mutated.pop().expect("non-empty");
        mutated.push(if last == 'A' { 'B' } else { 'A' });

        assert!(v.validate(&mutated, &record).is_none());
    }

    #[test]
    fn deactivated_record_fails() {
        let v = validator();
        let (full_key, mut record) = issue(&v, Environment::Live);
        record.is_active = false;

        assert!(v.validate(&full_key, &record).is_none());
    }

    #[test]
    fn expired_record_fails() {
        let v = validator();
        let (full_key, mut record) = issue(&v, Environment::Live);
        record.expires_at = Some(Utc::now() - chrono::Duration::hours(1));

        assert!(v.validate(&full_key, &record).is_none());
    }

    #[test]
    fn mismatched_key_id_fails() {
        let v = validator();
        let (full_key, mut record) = issue(&v, Environment::Live);
        record.key_id = "AAAAAAAAAAAA".to_string();

        assert!(v.validate(&full_key, &record).is_none());
    }

    #[test]
    fn parse_key_extracts_environment_and_id() {
        let issued = generator::generate(Environment::Test);
        let (environment, key_id) = parse_key(&issued.full_key).expect("parse");
        assert_eq!(environment, Environment::Test);
        assert_eq!(key_id, issued.key_id);
    }

    #[test]
    fn parse_key_rejects_garbage() {
        assert!(parse_key("").is_none());
        assert!(parse_key("np_live_short").is_none());
        assert!(parse_key("Bearer np_live_AAAAAAAAAAAA_BBB").is_none());
    }
}
