//! Structured error types for the map engine
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Failed to read {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FormatError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceUnavailable { path: path.into(), source }
    }

    /// Kind of the underlying I/O failure.
    #[must_use]
    pub fn io_kind(&self) -> std::io::ErrorKind {
        match self {
            Self::SourceUnavailable { source, .. } => source.kind(),
        }
    }
}

/// A permission word that is not four characters of `{r,-}{w,-}{x,-}{p,s}`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid permission string: {0:?}")]
pub struct PermsError(pub String);
