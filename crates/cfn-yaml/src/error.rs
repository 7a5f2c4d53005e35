//! Error types for YAML parsing.

use crate::SourceInfo;
use thiserror::Error;

/// Result type alias for cfn-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing a template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// YAML syntax error reported by the scanner
    #[error("parse error at {location}: {message}")]
    Syntax {
        message: String,
        location: SourceInfo,
    },

    /// Well-formed YAML that cannot be represented as a template tree
    #[error("unsupported YAML at {location}: {message}")]
    Unsupported {
        message: String,
        location: SourceInfo,
    },
}

impl Error {
    /// Location the error points at.
    pub fn location(&self) -> &SourceInfo {
        match self {
            Error::Syntax { location, .. } | Error::Unsupported { location, .. } => location,
        }
    }

    pub(crate) fn with_file(self, file: &str) -> Self {
        match self {
            Error::Syntax { message, location } => Error::Syntax {
                message,
                location: location.with_file(file),
            },
            Error::Unsupported { message, location } => Error::Unsupported {
                message,
                location: location.with_file(file),
            },
        }
    }
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        Error::Syntax {
            message: err.info().to_string(),
            location: SourceInfo::from_marker(err.marker()),
        }
    }
}
