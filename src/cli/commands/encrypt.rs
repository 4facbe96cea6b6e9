//! `credcore encrypt` — envelope-encrypt a value under a key context.

use crate::config::Settings;
use crate::crypto::{EnvelopeCipher, KeyContext};
use crate::errors::Result;

/// Execute the `encrypt` command.
pub fn execute(context: &str, value: &str) -> Result<()> {
    let context: KeyContext = context.parse()?;

    let settings = Settings::load(&std::env::current_dir()?)?;
    let cipher = EnvelopeCipher::new(settings.key_resolver());

    // Print the envelope alone so output can be piped into storage tooling.
    let envelope = cipher.encrypt(value, context)?;
    println!("{envelope}");

    Ok(())
}
