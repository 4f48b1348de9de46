//! The decrypt-edit-reencrypt workflow.

use std::path::PathBuf;

use zeroize::Zeroizing;

use super::scratch::ScratchFile;
use super::state::DocumentState;
use crate::crypto::{decrypt_with_key, encrypt_with_key, MasterKey};
use crate::errors::{CredentialsError, Result};
use crate::process::{CommandRunner, EditorCommand, ProcessRunner};
use crate::store::{FileSystem, OsFileSystem, StoragePaths};

/// Content seeded into a document that does not exist yet.
pub const PLACEHOLDER: &[u8] = b"initial: data\n";

/// Whether the editor session changed the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edited content differed and was re-encrypted to disk.
    Updated,
    /// The edited content was byte-identical; nothing was written.
    Unchanged,
}

/// Result of a successful `CredentialsEditor::open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditReport {
    /// Storage state found when the edit started.
    pub state: DocumentState,
    pub outcome: EditOutcome,
}

/// Opens the encrypted credentials in an editor and re-encrypts changes.
///
/// The editor process and the filesystem are injected so the workflow can
/// run against scripted collaborators.
pub struct CredentialsEditor<R = ProcessRunner, F = OsFileSystem> {
    paths: StoragePaths,
    editor: EditorCommand,
    runner: R,
    fs: F,
    scratch_dir: Option<PathBuf>,
}

impl CredentialsEditor {
    /// Editor backed by real processes and `std::fs`.
    pub fn with_defaults(paths: StoragePaths, editor: EditorCommand) -> Self {
        Self::new(paths, editor, ProcessRunner, OsFileSystem)
    }
}

impl<R: CommandRunner, F: FileSystem> CredentialsEditor<R, F> {
    pub fn new(paths: StoragePaths, editor: EditorCommand, runner: R, fs: F) -> Self {
        Self {
            paths,
            editor,
            runner,
            fs,
            scratch_dir: None,
        }
    }

    /// Place scratch files in `dir` instead of the system temp directory.
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Run one edit session.
    ///
    /// The permanent document is written at most once, and only after the
    /// editor exits successfully with changed content.  The scratch file is
    /// removed before this returns, whatever the outcome.
    pub fn open(&self) -> Result<EditReport> {
        let state = DocumentState::probe(&self.fs, &self.paths);
        let (key, original) = self.resolve(state)?;
        let edited = self.edit_in_scratch(&original)?;

        if edited.as_slice() == original.as_slice() {
            return Ok(EditReport {
                state,
                outcome: EditOutcome::Unchanged,
            });
        }

        self.encrypt_and_save(&key, &edited)?;
        Ok(EditReport {
            state,
            outcome: EditOutcome::Updated,
        })
    }

    /// Obtain the master key and the plaintext to edit for `state`.
    ///
    /// Only a fresh store touches the disk here; an orphaned document is
    /// refused before anything is created.
    fn resolve(&self, state: DocumentState) -> Result<(MasterKey, Zeroizing<Vec<u8>>)> {
        match state {
            DocumentState::Fresh => {
                self.fs
                    .create_dir_all(self.paths.dir())
                    .map_err(|e| CredentialsError::io("failed to create config directory", e))?;
                let key = MasterKey::generate(&self.fs, self.paths.master_key())?;
                self.encrypt_and_save(&key, PLACEHOLDER)?;
                Ok((key, Zeroizing::new(PLACEHOLDER.to_vec())))
            }
            DocumentState::Orphaned => {
                Err(CredentialsError::MissingKey(self.paths.master_key_name()))
            }
            DocumentState::KeyOnly => {
                let key = self.load_key()?;
                Ok((key, Zeroizing::new(PLACEHOLDER.to_vec())))
            }
            DocumentState::Existing => {
                let key = self.load_key()?;
                let ciphertext = self.fs.read(self.paths.credentials()).map_err(|e| {
                    CredentialsError::io("failed to read encrypted credentials", e)
                })?;
                let plaintext = decrypt_with_key(&key, &ciphertext)
                    .map_err(|e| CredentialsError::Decrypt(Box::new(e)))?;
                Ok((key, plaintext))
            }
        }
    }

    fn load_key(&self) -> Result<MasterKey> {
        MasterKey::load(&self.fs, self.paths.master_key())
            .map_err(|e| CredentialsError::KeyRead(Box::new(e)))
    }

    /// Write `plaintext` to a scratch file, run the editor on it, and read
    /// the result back.  The scratch guard drops on every path out.
    fn edit_in_scratch(&self, plaintext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let scratch = match &self.scratch_dir {
            Some(dir) => ScratchFile::create_in(dir, plaintext)?,
            None => ScratchFile::create(plaintext)?,
        };

        self.runner
            .run(self.editor.program(), &self.editor.args_for(scratch.path()))?;

        scratch.read()
    }

    fn encrypt_and_save(&self, key: &MasterKey, plaintext: &[u8]) -> Result<()> {
        let ciphertext = encrypt_with_key(key, plaintext)?;
        self.fs
            .write(self.paths.credentials(), &ciphertext)
            .map_err(|e| CredentialsError::io("failed to write encrypted credentials", e))
    }
}
