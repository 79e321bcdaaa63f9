//! Reading and writing pipeline artifacts.
//!
//! Writes go to a temporary file in the destination directory which is then
//! renamed over the target, so a failed run never leaves a truncated artifact
//! behind.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

/// An artifact could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The file does not exist.
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

/// An artifact could not be written.
#[derive(Debug, thiserror::Error)]
#[error("artifact write error: {}", path.display())]
pub struct WriteError {
    /// The destination.
    pub path: PathBuf,
    /// The underlying error.
    #[source]
    pub source: io::Error,
}

/// Reads a UTF-8 artifact produced by an earlier pipeline step.
///
/// # Errors
///
/// Returns [`ReadError::NotFound`] if the file is absent, or
/// [`ReadError::Io`] if it cannot be read.
pub fn read(path: &Path) -> Result<String, ReadError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ReadError::NotFound(path.to_path_buf()),
        _ => ReadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Atomically replaces `path` with `contents`.
///
/// Parent directories are created automatically if they don't exist.
///
/// # Errors
///
/// Returns an error if the directory, temporary file or rename fails. The
/// original file is left untouched in that case.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), WriteError> {
    let wrap = |source| WriteError {
        path: path.to_path_buf(),
        source,
    };

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory).map_err(wrap)?;

    let mut file = tempfile::NamedTempFile::new_in(directory).map_err(wrap)?;
    file.write_all(contents.as_bytes()).map_err(wrap)?;
    file.as_file().sync_all().map_err(wrap)?;
    file.persist(path).map_err(|error| wrap(error.error))?;

    tracing::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
