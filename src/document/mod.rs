//! Editable document: the encrypt-edit-reencrypt lifecycle.
//!
//! This module provides:
//! - `DocumentState`, the key/document presence probe (`state`)
//! - `ScratchFile`, the self-deleting plaintext temp file (`scratch`)
//! - `CredentialsEditor`, the workflow that ties them together (`editor`)

pub mod editor;
pub mod scratch;
pub mod state;

pub use editor::{CredentialsEditor, EditOutcome, EditReport, PLACEHOLDER};
pub use scratch::ScratchFile;
pub use state::DocumentState;
