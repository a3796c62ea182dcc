//! Artifact delivery: read the produced file for handoff to the host.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// A delivered file and its exact contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Name offered to the user when saving
    pub file_name: String,

    /// Where the bytes were read from
    pub path: PathBuf,

    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Read `path` and name the artifact after its file name.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = deliver(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact.bin".to_string());
        Ok(Self {
            file_name,
            path: path.to_path_buf(),
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Read the artifact at `path` fully.
///
/// # Errors
/// [`Error::ArtifactMissing`] if nothing is there, [`Error::Io`] otherwise.
pub fn deliver(path: &Path) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => {
            tracing::debug!("Delivering {} ({} bytes)", path.display(), bytes.len());
            Ok(bytes)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::ArtifactMissing(path.to_path_buf())),
        Err(e) => Err(Error::io(path, e)),
    }
}
