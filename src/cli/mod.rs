//! CLI module — Clap argument parser and command implementations.

pub mod commands;

use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;
use crate::errors::Result;
use crate::store::StoragePaths;

/// Credentials CLI: encrypted application secrets.
#[derive(Parser)]
#[command(
    name = "credentials",
    about = "Encrypted application credentials manager",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding master.key and credentials.yml.enc (default: config)
    #[arg(long, env = "CREDENTIALS_CONFIG_DIR", global = true)]
    pub config_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Open credentials in an editor (decrypts to temp file, re-encrypts on save)
    Edit {
        /// Editor command (default: $VISUAL, then $EDITOR, then vi)
        #[arg(long)]
        editor: Option<String>,
    },

    /// Print the decrypted credentials to stdout
    Show,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Settings and storage locations resolved for the current directory.
pub struct Context {
    pub project_dir: PathBuf,
    pub settings: Settings,
    pub paths: StoragePaths,
}

/// Load `.credentials.toml` from the working directory and apply CLI
/// overrides on top of it.
pub fn load_context(cli: &Cli) -> Result<Context> {
    let project_dir = std::env::current_dir()?;
    let mut settings = Settings::load(&project_dir)?;

    if let Some(dir) = &cli.config_dir {
        settings.config_dir = dir.clone();
    }

    let paths = settings.storage_paths(&project_dir);
    Ok(Context {
        project_dir,
        settings,
        paths,
    })
}
