//! Structured error types for report generation
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// The map has no segments, so there is no address range to draw.
    #[error("No memory segments to visualize")]
    NothingToVisualize,

    #[error("Failed to write report to {}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_nothing_to_visualize_display() {
        assert_eq!(ReportError::NothingToVisualize.to_string(), "No memory segments to visualize");
    }

    #[test]
    fn test_write_failed_keeps_source() {
        let err = ReportError::WriteFailed {
            path: PathBuf::from("/tmp/out/report.html"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/tmp/out/report.html"));
        assert!(err.source().is_some());
    }
}
