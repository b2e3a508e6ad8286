use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of [`write_output`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "WriteResult tells whether the file changed"]
pub enum WriteResult {
    Written { path: PathBuf, bytes: usize },
    /// The file already held exactly this text and was left untouched.
    Unchanged { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. } | WriteResult::Unchanged { path } => path,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, WriteResult::Unchanged { .. })
    }
}

/// Write `text` to `path` unless it already holds the same text.
///
/// Missing parent directories are created.
pub fn write_output(path: &Path, text: &str) -> Result<WriteResult, WriteError> {
    let io_error = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    match fs::read(path) {
        Ok(current) if current == text.as_bytes() => {
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            })
        }
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(io_error(err)),
    }

    atomic_write(path, text.as_bytes()).map_err(io_error)?;
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
        bytes: text.len(),
    })
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Same directory keeps the rename on one filesystem.
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// The current contents of `path`, or empty text if it does not exist yet.
pub fn read_existing(path: &Path) -> Result<String, WriteError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(WriteError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
