//! `credentials edit` — open the credentials in an editor.
//!
//! Decrypts the document to a temporary file, launches the editor, and
//! re-encrypts the result if anything changed.

use crate::output;
use crate::cli::{load_context, Cli};
use crate::document::{CredentialsEditor, DocumentState, EditOutcome};
use crate::errors::Result;
use crate::process::{resolve_editor, EditorCommand};

/// Execute the `edit` command.
pub fn execute(cli: &Cli, editor: Option<&str>) -> Result<()> {
    let ctx = load_context(cli)?;

    let editor = resolve_editor(editor.or(ctx.settings.editor.as_deref()));
    let editor = EditorCommand::parse(&editor)?;

    let report = CredentialsEditor::with_defaults(ctx.paths.clone(), editor).open()?;

    if report.state == DocumentState::Fresh {
        output::info(&format!(
            "Generated a new master key at {}",
            ctx.paths.master_key().display()
        ));
        output::tip("Keep the master key out of version control; only commit the encrypted file.");
    }

    match report.outcome {
        EditOutcome::Updated => output::success(&format!(
            "Credentials updated at {}",
            ctx.paths.credentials().display()
        )),
        EditOutcome::Unchanged => {
            output::info("No changes made. Credentials remain the same.");
        }
    }

    Ok(())
}
