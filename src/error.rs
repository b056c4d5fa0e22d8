//! Error type for report runs.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Fatal errors of a report run. Field-level problems are never errors;
/// they resolve to defaults during hydration.
#[derive(Debug)]
pub enum ReportError {
    /// Input file could not be opened or read
    Io { path: PathBuf, source: io::Error },
    /// Input file is not well-formed JSON
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Input is JSON but not an array
    NotAnArray { path: PathBuf, found: &'static str },
    /// Summary could not be encoded
    Encode(serde_json::Error),
    /// Report could not be written to stdout
    Output(io::Error),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Io { path, source } => {
                write!(f, "Failed to open file: {}: {}", path.display(), source)
            }
            ReportError::Decode { path, source } => {
                write!(f, "Invalid JSON in {}: {}", path.display(), source)
            }
            ReportError::NotAnArray { path, found } => {
                write!(f, "Expected a JSON array in {}, found {}", path.display(), found)
            }
            ReportError::Encode(e) => write!(f, "Failed to encode summary: {}", e),
            ReportError::Output(e) => write!(f, "Failed to write report: {}", e),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io { source, .. } => Some(source),
            ReportError::Decode { source, .. } => Some(source),
            ReportError::NotAnArray { .. } => None,
            ReportError::Encode(e) => Some(e),
            ReportError::Output(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Encode(err)
    }
}
