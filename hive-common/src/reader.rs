//! Status document reader.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{Error, Result};

/// Loads the raw bytes of the status document from a fixed path.
#[derive(Debug, Clone)]
pub struct StatusReader {
    path: PathBuf,
}

impl StatusReader {
    /// Create a reader for the given document path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the status document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document.
    ///
    /// Returns [`Error::NotFound`] when the file does not exist (including when
    /// it disappears between the existence check and the read) and
    /// [`Error::ReadFailure`] for any other I/O error.
    pub async fn read(&self) -> Result<Vec<u8>> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|source| self.read_failure(source))?;

        if !exists {
            return Err(Error::NotFound {
                path: self.path.clone(),
            });
        }

        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => Error::NotFound {
                    path: self.path.clone(),
                },
                _ => self.read_failure(source),
            })?;

        trace!(path = %self.path.display(), bytes = data.len(), "Read status document");
        Ok(data)
    }

    fn read_failure(&self, source: std::io::Error) -> Error {
        Error::ReadFailure {
            path: self.path.clone(),
            source,
        }
    }
}
