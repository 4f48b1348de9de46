use crate::store::{FileSystem, StoragePaths};

/// What the storage directory holds when an edit starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Neither the key nor the document exists: first run.
    Fresh,
    /// The document exists but its key does not.  Editing is refused.
    Orphaned,
    /// The key exists but no document has been saved yet.
    KeyOnly,
    /// Both exist: decrypt and edit.
    Existing,
}

impl DocumentState {
    /// Probe the storage directory for the key and document files.
    pub fn probe(fs: &impl FileSystem, paths: &StoragePaths) -> Self {
        match (fs.is_file(paths.master_key()), fs.is_file(paths.credentials())) {
            (false, false) => Self::Fresh,
            (false, true) => Self::Orphaned,
            (true, false) => Self::KeyOnly,
            (true, true) => Self::Existing,
        }
    }
}
