//! Source locations for parse errors.

use std::fmt;

/// Position of a YAML element in the original source text.
///
/// Only used to locate parse errors; [`DocumentNode`](crate::DocumentNode)
/// trees do not carry locations so that structural equality stays purely
/// about content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    /// Optional filename or source identifier
    pub file: Option<String>,

    /// Byte offset from start of source (0-based)
    pub offset: usize,

    /// Line number (1-based)
    pub line: usize,

    /// Column number (1-based, in characters not bytes)
    pub col: usize,
}

impl SourceInfo {
    pub fn new(file: Option<String>, offset: usize, line: usize, col: usize) -> Self {
        Self {
            file,
            offset,
            line,
            col,
        }
    }

    /// Create a SourceInfo from a yaml-rust2 marker.
    pub fn from_marker(marker: &yaml_rust2::scanner::Marker) -> Self {
        Self {
            file: None,
            offset: marker.index(),
            line: marker.line() + 1, // yaml-rust2 uses 0-based, we use 1-based
            col: marker.col() + 1,
        }
    }

    /// Set the filename for this source location.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl Default for SourceInfo {
    fn default() -> Self {
        Self {
            file: None,
            offset: 0,
            line: 1,
            col: 1,
        }
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.col),
            None => write!(f, "{}:{}", self.line, self.col),
        }
    }
}
