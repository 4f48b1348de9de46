//! Integration tests for the edit workflow.
//!
//! A scripted `CommandRunner` stands in for the editor process: it records
//! the file it was handed and optionally rewrites it or fails.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use credentials::crypto::{encrypt_with_key, MasterKey};
use credentials::document::{CredentialsEditor, DocumentState, EditOutcome, PLACEHOLDER};
use credentials::errors::{CredentialsError, Result};
use credentials::process::{CommandRunner, EditorCommand};
use credentials::reader::ConfigReader;
use credentials::store::{OsFileSystem, StoragePaths};
use tempfile::TempDir;

/// One recorded editor invocation.
struct Call {
    program: String,
    args: Vec<OsString>,
    file: PathBuf,
    seen: Vec<u8>,
}

#[derive(Default)]
struct ScriptedEditor {
    replacement: Option<Vec<u8>>,
    fail: bool,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedEditor {
    fn keeping() -> Self {
        Self::default()
    }

    fn writing(content: &[u8]) -> Self {
        Self {
            replacement: Some(content.to_vec()),
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn last_file(&self) -> PathBuf {
        self.calls.borrow().last().expect("editor was called").file.clone()
    }

    fn last_seen(&self) -> Vec<u8> {
        self.calls.borrow().last().expect("editor was called").seen.clone()
    }
}

impl CommandRunner for ScriptedEditor {
    fn run(&self, program: &str, args: &[OsString]) -> Result<()> {
        let file = PathBuf::from(args.last().expect("file argument"));
        let seen = fs::read(&file).expect("scratch file exists while editing");
        self.calls.borrow_mut().push(Call {
            program: program.to_string(),
            args: args.to_vec(),
            file: file.clone(),
            seen,
        });

        if self.fail {
            return Err(CredentialsError::Editor("'vim' exited with code 1".into()));
        }
        if let Some(content) = &self.replacement {
            fs::write(&file, content).expect("rewrite scratch file");
        }
        Ok(())
    }
}

/// A project directory with a separate directory for scratch files.
struct Workspace {
    _root: TempDir,
    paths: StoragePaths,
    scratch: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let paths = StoragePaths::in_dir(root.path().join("config"));
        let scratch = root.path().join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        Self {
            _root: root,
            paths,
            scratch,
        }
    }

    /// Store a key and an encrypted document holding `plaintext`.
    fn seeded(plaintext: &[u8]) -> Self {
        let ws = Self::new();
        fs::create_dir_all(ws.paths.dir()).unwrap();
        let key = MasterKey::generate(&OsFileSystem, ws.paths.master_key()).unwrap();
        fs::write(ws.paths.credentials(), encrypt_with_key(&key, plaintext).unwrap()).unwrap();
        ws
    }

    fn editor<'a>(&self, runner: &'a ScriptedEditor) -> CredentialsEditor<&'a ScriptedEditor> {
        CredentialsEditor::new(
            self.paths.clone(),
            EditorCommand::parse("vim").unwrap(),
            runner,
            OsFileSystem,
        )
        .scratch_dir(&self.scratch)
    }

    fn decrypted(&self) -> Vec<u8> {
        ConfigReader::new(self.paths.clone())
            .decrypt_document()
            .expect("document decrypts")
            .to_vec()
    }

    fn scratch_is_empty(&self) -> bool {
        fs::read_dir(&self.scratch).unwrap().next().is_none()
    }
}

/// Every file under `dir` with its contents.
fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path();
            let data = fs::read(&path).unwrap();
            (path, data)
        })
        .collect();
    entries.sort();
    entries
}

// ---------------------------------------------------------------------------
// First run
// ---------------------------------------------------------------------------

#[test]
fn first_run_creates_key_and_document() {
    let ws = Workspace::new();
    let runner = ScriptedEditor::keeping();

    let report = ws.editor(&runner).open().unwrap();
    assert_eq!(report.state, DocumentState::Fresh);
    assert_eq!(report.outcome, EditOutcome::Unchanged);

    assert!(ws.paths.master_key().is_file());
    assert!(ws.paths.credentials().is_file());
    assert_eq!(runner.last_seen(), PLACEHOLDER);
    assert_eq!(ws.decrypted(), PLACEHOLDER);
    assert!(ws.scratch_is_empty());
}

#[test]
fn first_run_creates_missing_storage_directory() {
    let root = TempDir::new().unwrap();
    let paths = StoragePaths::in_dir(root.path().join("app").join("config"));
    assert!(!paths.dir().exists());

    let runner = ScriptedEditor::keeping();
    let report = CredentialsEditor::new(
        paths.clone(),
        EditorCommand::parse("vim").unwrap(),
        &runner,
        OsFileSystem,
    )
    .scratch_dir(root.path())
    .open()
    .unwrap();

    assert_eq!(report.state, DocumentState::Fresh);
    assert!(paths.master_key().is_file());
    assert!(paths.credentials().is_file());
}

#[test]
fn first_run_saves_edits() {
    let ws = Workspace::new();
    let runner = ScriptedEditor::writing(b"develop:\n  access_token: token\n");

    let report = ws.editor(&runner).open().unwrap();
    assert_eq!(report.state, DocumentState::Fresh);
    assert_eq!(report.outcome, EditOutcome::Updated);
    assert_eq!(ws.decrypted(), b"develop:\n  access_token: token\n");
}

#[test]
fn first_run_keeps_generated_key_when_editor_fails() {
    let ws = Workspace::new();
    let runner = ScriptedEditor::failing();

    let err = ws.editor(&runner).open().unwrap_err();
    assert!(matches!(err, CredentialsError::Editor(_)));

    // The seeded document must stay readable with the key that was written.
    assert_eq!(ws.decrypted(), PLACEHOLDER);
    assert!(ws.scratch_is_empty());
}

// ---------------------------------------------------------------------------
// Orphaned document
// ---------------------------------------------------------------------------

#[test]
fn orphaned_document_is_refused_without_changes() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.paths.dir()).unwrap();
    fs::write(ws.paths.credentials(), b"0123456789abcdef-encrypted").unwrap();
    let before = snapshot(ws.paths.dir());

    let runner = ScriptedEditor::writing(b"should never be saved");
    let err = ws.editor(&runner).open().unwrap_err();

    assert_eq!(err.to_string(), "master.key is missing. Editing is not allowed");
    assert!(matches!(err, CredentialsError::MissingKey(_)));
    assert_eq!(runner.call_count(), 0);
    assert_eq!(snapshot(ws.paths.dir()), before);
    assert!(!ws.paths.master_key().exists());
    assert!(ws.scratch_is_empty());
}

#[test]
fn orphan_message_uses_configured_key_name() {
    let root = TempDir::new().unwrap();
    let paths = StoragePaths::new(root.path(), "prod.yml.enc", "prod.key");
    fs::write(paths.credentials(), b"whatever").unwrap();

    let runner = ScriptedEditor::keeping();
    let err = CredentialsEditor::new(
        paths,
        EditorCommand::parse("vim").unwrap(),
        &runner,
        OsFileSystem,
    )
    .open()
    .unwrap_err();
    assert_eq!(err.to_string(), "prod.key is missing. Editing is not allowed");
}

// ---------------------------------------------------------------------------
// Key present, document missing
// ---------------------------------------------------------------------------

#[test]
fn key_only_without_changes_writes_nothing() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.paths.dir()).unwrap();
    MasterKey::generate(&OsFileSystem, ws.paths.master_key()).unwrap();

    let runner = ScriptedEditor::keeping();
    let report = ws.editor(&runner).open().unwrap();

    assert_eq!(report.state, DocumentState::KeyOnly);
    assert_eq!(report.outcome, EditOutcome::Unchanged);
    assert_eq!(runner.last_seen(), PLACEHOLDER);
    assert!(!ws.paths.credentials().exists());
}

#[test]
fn key_only_with_changes_creates_document() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.paths.dir()).unwrap();
    let key = MasterKey::generate(&OsFileSystem, ws.paths.master_key()).unwrap();

    let runner = ScriptedEditor::writing(b"production:\n  api_key: k\n");
    let report = ws.editor(&runner).open().unwrap();

    assert_eq!(report.outcome, EditOutcome::Updated);
    assert_eq!(ws.decrypted(), b"production:\n  api_key: k\n");

    // The existing key was reused, not regenerated.
    let reloaded = MasterKey::load(&OsFileSystem, ws.paths.master_key()).unwrap();
    assert_eq!(reloaded.as_bytes(), key.as_bytes());
}

// ---------------------------------------------------------------------------
// Existing document
// ---------------------------------------------------------------------------

#[test]
fn editor_receives_decrypted_document() {
    let ws = Workspace::seeded(b"develop:\n  access_token: token");
    let runner = ScriptedEditor::keeping();

    ws.editor(&runner).open().unwrap();
    assert_eq!(runner.last_seen(), b"develop:\n  access_token: token");
}

#[test]
fn unchanged_content_leaves_document_untouched() {
    let ws = Workspace::seeded(b"develop:\n  access_token: token\n");
    let bytes_before = fs::read(ws.paths.credentials()).unwrap();
    let mtime_before = fs::metadata(ws.paths.credentials())
        .unwrap()
        .modified()
        .unwrap();

    let runner = ScriptedEditor::keeping();
    let report = ws.editor(&runner).open().unwrap();

    assert_eq!(report.state, DocumentState::Existing);
    assert_eq!(report.outcome, EditOutcome::Unchanged);
    assert_eq!(fs::read(ws.paths.credentials()).unwrap(), bytes_before);
    assert_eq!(
        fs::metadata(ws.paths.credentials())
            .unwrap()
            .modified()
            .unwrap(),
        mtime_before
    );
    assert!(!runner.last_file().exists());
    assert!(ws.scratch_is_empty());
}

#[test]
fn changed_content_is_reencrypted() {
    let ws = Workspace::seeded(b"develop:\n  access_token: token\n");
    let bytes_before = fs::read(ws.paths.credentials()).unwrap();

    let runner = ScriptedEditor::writing(b"develop:\n  access_token: rotated\n");
    let report = ws.editor(&runner).open().unwrap();

    assert_eq!(report.outcome, EditOutcome::Updated);
    let bytes_after = fs::read(ws.paths.credentials()).unwrap();
    assert_ne!(bytes_after, bytes_before);
    assert!(!bytes_after
        .windows(b"rotated".len())
        .any(|w| w == b"rotated"));
    assert_eq!(ws.decrypted(), b"develop:\n  access_token: rotated\n");
    assert!(ws.scratch_is_empty());
}

#[test]
fn whitespace_only_change_counts_as_change() {
    let ws = Workspace::seeded(b"a: 1\n");
    let runner = ScriptedEditor::writing(b"a: 1\n\n");

    let report = ws.editor(&runner).open().unwrap();
    assert_eq!(report.outcome, EditOutcome::Updated);
}

#[test]
fn editor_failure_aborts_before_any_write() {
    let ws = Workspace::seeded(b"develop:\n  access_token: token\n");
    let before = snapshot(ws.paths.dir());

    let runner = ScriptedEditor::failing();
    let err = ws.editor(&runner).open().unwrap_err();

    assert_eq!(err.to_string(), "failed to open editor: 'vim' exited with code 1");
    assert_eq!(snapshot(ws.paths.dir()), before);
    assert!(!runner.last_file().exists());
    assert!(ws.scratch_is_empty());
}

// ---------------------------------------------------------------------------
// Corrupt inputs
// ---------------------------------------------------------------------------

#[test]
fn short_document_fails_to_decrypt() {
    let ws = Workspace::seeded(b"");
    fs::write(ws.paths.credentials(), b"short").unwrap();
    let before = snapshot(ws.paths.dir());

    let runner = ScriptedEditor::keeping();
    let err = ws.editor(&runner).open().unwrap_err();

    assert_eq!(err.to_string(), "failed to decrypt credentials: ciphertext too short");
    assert_eq!(runner.call_count(), 0);
    assert_eq!(snapshot(ws.paths.dir()), before);
}

#[test]
fn malformed_key_fails_to_load() {
    let ws = Workspace::seeded(b"a: 1\n");
    fs::write(ws.paths.master_key(), "zz-not-hex").unwrap();

    let runner = ScriptedEditor::keeping();
    let err = ws.editor(&runner).open().unwrap_err();

    assert!(matches!(err, CredentialsError::KeyRead(_)));
    assert!(err.to_string().starts_with("failed to read master key: invalid master key"));
    assert_eq!(runner.call_count(), 0);
}

// ---------------------------------------------------------------------------
// Editor invocation
// ---------------------------------------------------------------------------

#[test]
fn editor_arguments_precede_the_file() {
    let ws = Workspace::seeded(b"a: 1\n");
    let runner = ScriptedEditor::keeping();

    CredentialsEditor::new(
        ws.paths.clone(),
        EditorCommand::parse("code --wait").unwrap(),
        &runner,
        OsFileSystem,
    )
    .scratch_dir(&ws.scratch)
    .open()
    .unwrap();

    let calls = runner.calls.borrow();
    assert_eq!(calls[0].program, "code");
    assert_eq!(calls[0].args.len(), 2);
    assert_eq!(calls[0].args[0], OsString::from("--wait"));
    assert_eq!(PathBuf::from(&calls[0].args[1]), calls[0].file);
    assert!(calls[0].file.starts_with(&ws.scratch));
}
