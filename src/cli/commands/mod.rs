//! Command implementations, one module per subcommand.

pub mod decrypt;
pub mod encrypt;
pub mod issue_key;
