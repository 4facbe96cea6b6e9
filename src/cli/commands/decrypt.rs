//! `credcore decrypt` — decrypt an envelope and print the plaintext.

use crate::config::Settings;
use crate::crypto::{EnvelopeCipher, KeyContext};
use crate::errors::Result;

/// Execute the `decrypt` command.
pub fn execute(context: &str, envelope: &str) -> Result<()> {
    let context: KeyContext = context.parse()?;

    let settings = Settings::load(&std::env::current_dir()?)?;
    let cipher = EnvelopeCipher::new(settings.key_resolver());

    let value = cipher.decrypt(envelope, context)?;
    println!("{value}");

    Ok(())
}
