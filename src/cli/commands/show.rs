//! `credentials show` — print the decrypted document.

use std::io::{self, Write};

use crate::cli::{load_context, Cli};
use crate::errors::Result;
use crate::reader::ConfigReader;

/// Execute the `show` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = load_context(cli)?;
    let plaintext = ConfigReader::from_settings(&ctx.settings, &ctx.project_dir).decrypt_document()?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&plaintext)?;
    if !plaintext.ends_with(b"\n") {
        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}
