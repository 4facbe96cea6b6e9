//! `credcore issue-key` — generate an API key and print its record.
//!
//! The full key appears in the output exactly once; only the record
//! (with the keyed digest) is meant to be persisted.

use uuid::Uuid;

use crate::apikey::{generator, ApiKeyHasher, ApiKeyRecord, Environment, KeyOwner};
use crate::cli::output;
use crate::errors::{CredCoreError, Result};

/// Execute the `issue-key` command.
pub fn execute(
    environment: &str,
    name: &str,
    application: Option<Uuid>,
    user: Option<Uuid>,
    permissions: &[String],
) -> Result<()> {
    let environment: Environment = environment.parse()?;

    let owner = match (application, user) {
        (Some(id), None) => KeyOwner::Application(id),
        (None, Some(id)) => KeyOwner::User(id),
        _ => {
            return Err(CredCoreError::CommandFailed(
                "provide exactly one of --application <uuid> or --user <uuid>".into(),
            ))
        }
    };

    let hasher = ApiKeyHasher::from_env()?;
    let issued = generator::generate(environment);

    let record = ApiKeyRecord::new(
        owner,
        issued.key_id.clone(),
        hasher.hash(&issued.full_key),
        name,
        environment,
        permissions.to_vec(),
    );

    output::success(&format!("Issued {environment} key {}", record.key_id));
    output::warning("Store the full key now — it cannot be shown again.");
    println!("{}", issued.full_key);

    println!();
    output::tip("Record to persist (digest only, never the key):");
    let json = serde_json::to_string_pretty(&record)
        .map_err(|e| CredCoreError::CommandFailed(format!("serialize record: {e}")))?;
    println!("{json}");

    Ok(())
}
