//! Error types for tandem-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostics::{Diagnostic, Origin, Severity};

/// Result type for tandem-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tandem-core.
#[derive(Debug, Error)]
pub enum Error {
    /// Network fetch of an archive failed or timed out.
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Byte stream is not a well-formed archive, or an entry escapes its root.
    #[error("archive error: {0}")]
    Archive(String),

    /// The front-end compiler rejected the source.
    #[error("compilation failed with {errors} error(s)")]
    Compile { errors: usize },

    /// The backend engine reported at least one error.
    #[error("transpilation failed with {errors} error(s)")]
    Transpile { errors: usize },

    /// Delivery found no artifact to read.
    #[error("artifact not found at {0}")]
    ArtifactMissing(PathBuf),

    /// IO error on a specific path.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Submitted source could not be materialized.
    #[error("invalid source unit: {0}")]
    Ingest(String),

    /// Two backend plugins contribute the same intrinsic.
    #[error("plugin '{plugin}' redefines intrinsic '{intrinsic}' already contributed by '{owner}'")]
    PluginConflict {
        plugin: String,
        intrinsic: String,
        owner: String,
    },

    /// An external tool could not be located or started.
    #[error("toolchain error: {0}")]
    Toolchain(String),

    /// Configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Another run currently holds the namespace roots.
    #[error("a pipeline run is already in progress")]
    RunInProgress,
}

impl Error {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Render the error together with a recovery hint, for terminal output.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Self::Fetch { .. } => {
                Some("check `library_url` in the config and that the host is reachable")
            }
            Self::Archive(_) => Some("the archive may be truncated; re-download it"),
            Self::Compile { .. } | Self::Transpile { .. } => {
                Some("see the diagnostics above for details")
            }
            Self::Toolchain(_) => {
                Some("install the tool or point `compiler.program` / `engine.program` at it")
            }
            Self::PluginConflict { .. } => Some("remove one of the overlapping plugins"),
            Self::RunInProgress => Some("wait for the current run to finish"),
            _ => None,
        };
        match hint {
            Some(hint) => format!("{self}\n  hint: {hint}"),
            None => self.to_string(),
        }
    }

    /// Single synthetic diagnostic used when an infrastructure error ends a run.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let origin = match self {
            Self::Transpile { .. } | Self::PluginConflict { .. } => Origin::Transpile,
            _ => Origin::Compile,
        };
        Diagnostic::new(Severity::Error, origin, self.to_string())
    }
}
