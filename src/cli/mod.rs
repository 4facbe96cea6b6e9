//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use clap::Parser;
use uuid::Uuid;

/// credcore CLI: operator tooling for the credential security core.
#[derive(Parser)]
#[command(
    name = "credcore",
    about = "Envelope encryption and API key issuance",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Encrypt a value under a key context
    Encrypt {
        /// Key context: api-credentials, user-secrets, internal, or default
        #[arg(short, long, default_value = "default")]
        context: String,

        /// Plaintext value to encrypt
        value: String,
    },

    /// Decrypt an envelope under a key context
    Decrypt {
        /// Key context: api-credentials, user-secrets, internal, or default
        #[arg(short, long, default_value = "default")]
        context: String,

        /// Base64 envelope to decrypt
        envelope: String,
    },

    /// Issue a new API key (the full key is shown exactly once)
    IssueKey {
        /// Key environment: live or test
        #[arg(short, long, default_value = "test")]
        environment: String,

        /// Human-readable key name
        #[arg(short, long)]
        name: String,

        /// Owning application id
        #[arg(long, conflicts_with = "user")]
        application: Option<Uuid>,

        /// Owning user id
        #[arg(long)]
        user: Option<Uuid>,

        /// Permission to grant (repeatable; none grants unrestricted access)
        #[arg(short, long = "permission")]
        permissions: Vec<String>,
    },
}
