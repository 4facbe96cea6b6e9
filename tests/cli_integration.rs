//! CLI integration tests — exercise the `credcore` binary end to end.

use assert_cmd::Command;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use predicates::prelude::*;

/// A fixed, valid 32-byte master key for subprocess environments.
fn master_key() -> String {
    BASE64.encode([0x42u8; 32])
}

fn credcore() -> Command {
    Command::cargo_bin("credcore").expect("binary builds")
}

#[test]
fn encrypt_then_decrypt_round_trips() {
    let output = credcore()
        .env("NP_ENCRYPTION_KEY", master_key())
        .args(["encrypt", "--context", "api-credentials", "sk_provider_secret"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let envelope = String::from_utf8(output).expect("utf8");
    let envelope = envelope.trim();

    credcore()
        .env("NP_ENCRYPTION_KEY", master_key())
        .args(["decrypt", "--context", "api-credentials", envelope])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk_provider_secret"));
}

#[test]
fn decrypt_under_wrong_context_fails() {
    let output = credcore()
        .env("NP_ENCRYPTION_KEY", master_key())
        .args(["encrypt", "--context", "user-secrets", "value"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let envelope = String::from_utf8(output).expect("utf8");

    credcore()
        .env("NP_ENCRYPTION_KEY", master_key())
        .args(["decrypt", "--context", "internal", envelope.trim()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decryption failed"));
}

#[test]
fn encrypt_without_configured_key_fails() {
    credcore()
        .env_remove("NP_ENCRYPTION_KEY")
        .env_remove("NP_INTERNAL_ENCRYPTION_KEY")
        .args(["encrypt", "--context", "internal", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No encryption key configured"));
}

#[test]
fn unknown_context_is_rejected() {
    credcore()
        .env("NP_ENCRYPTION_KEY", master_key())
        .args(["encrypt", "--context", "payments", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown key context"));
}

#[test]
fn issue_key_prints_the_full_key_once() {
    credcore()
        .env("NP_API_KEY_HASH_KEY", "server-hash-key")
        .args([
            "issue-key",
            "--environment",
            "live",
            "--name",
            "ci deploys",
            "--application",
            "8f8c3f86-8a4e-4a5b-9d6e-0a1b2c3d4e5f",
            "--permission",
            "ramp:*",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("np_live_"))
        .stdout(predicate::str::contains("hashed_key"));
}

#[test]
fn issue_key_requires_an_owner() {
    credcore()
        .env("NP_API_KEY_HASH_KEY", "server-hash-key")
        .args(["issue-key", "--environment", "test", "--name", "orphan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--application"));
}
