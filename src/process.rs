//! Editor/process capability.
//!
//! The edit workflow hands the scratch file to an external editor through
//! `CommandRunner`, so tests can substitute a scripted editor for a real
//! process.

use std::ffi::OsString;
use std::process::{Command, Stdio};

use crate::errors::{CredentialsError, Result};

/// Fallback when neither the settings nor the environment name an editor.
pub const DEFAULT_EDITOR: &str = "vi";

/// Runs an external program and waits for it to exit.
pub trait CommandRunner {
    /// Run `program` with `args`.  Fails if the program cannot be started
    /// or exits unsuccessfully.
    fn run(&self, program: &str, args: &[OsString]) -> Result<()>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[OsString]) -> Result<()> {
        (**self).run(program, args)
    }
}

/// `CommandRunner` that spawns a real process attached to the terminal.
///
/// Blocks until the child exits; there is no timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<()> {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| CredentialsError::Editor(format!("could not launch '{program}': {e}")))?;

        if !status.success() {
            return Err(match status.code() {
                Some(code) => CredentialsError::Editor(format!("'{program}' exited with code {code}")),
                None => CredentialsError::Editor(format!("'{program}' terminated by signal")),
            });
        }

        Ok(())
    }
}

/// An editor command line such as `vim` or `code --wait`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    program: String,
    args: Vec<String>,
}

impl EditorCommand {
    /// Split an editor string on whitespace into program and arguments.
    pub fn parse(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| CredentialsError::Editor("editor command is empty".into()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for one invocation: the configured ones, then `file`.
    pub fn args_for(&self, file: &std::path::Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(OsString::from)
            .chain(std::iter::once(file.as_os_str().to_os_string()))
            .collect()
    }
}

/// Find the user's preferred editor.
///
/// Order: explicit choice (flag or settings), `$VISUAL`, `$EDITOR`, `vi`.
pub fn resolve_editor(explicit: Option<&str>) -> String {
    resolve_editor_with(explicit, |name| std::env::var(name).ok())
}

fn resolve_editor_with(explicit: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> String {
    if let Some(editor) = explicit.filter(|e| !e.trim().is_empty()) {
        return editor.to_string();
    }

    for var in ["VISUAL", "EDITOR"] {
        if let Some(editor) = lookup(var).filter(|e| !e.trim().is_empty()) {
            return editor;
        }
    }

    DEFAULT_EDITOR.to_string()
}
