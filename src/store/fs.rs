//! Filesystem capability.
//!
//! The edit workflow and the reader only touch the key and document
//! files through `FileSystem`, so tests can observe or replace disk
//! access without changing the orchestration code.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Narrow file access used by the edit and read workflows.
pub trait FileSystem {
    /// Read the whole file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the file's contents.
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Create or replace a file readable and writable by its owner only.
    fn write_private(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// True when `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        (**self).write(path, data)
    }

    fn write_private(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        (**self).write_private(path, data)
    }

    fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path)
    }
}

/// `FileSystem` backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    /// Atomic write: write to a temp file, then rename.
    /// The temp file is in the same directory so rename stays on the
    /// same filesystem.
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let parent = path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));

        fs::write(&tmp_path, data)?;
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(())
    }

    fn write_private(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        #[cfg(unix)]
        let mut file = {
            use std::os::unix::fs::OpenOptionsExt;
            fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)?
        };

        #[cfg(not(unix))]
        let mut file = fs::File::create(path)?;

        file.write_all(data)?;
        file.flush()?;

        // `mode` only applies on creation; tighten a pre-existing file too.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}
