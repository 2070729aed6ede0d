//! Loader error types.
//!
//! Loading is the only fallible surface of the splitter: parsing never
//! fails on malformed source, but unreadable files and malformed rule
//! patterns must reach the caller.

use std::fmt;
use std::path::PathBuf;

/// An error raised while loading files into an entity tree.
#[derive(Debug)]
pub enum LoadError {
    /// A file or directory could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A user-supplied rule pattern did not compile.
    BadPattern {
        pattern: String,
        source: globset::Error,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read '{}': {source}", path.display())
            }
            Self::BadPattern { pattern, source } => {
                write!(f, "invalid rule pattern '{pattern}': {source}")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::BadPattern { source, .. } => Some(source),
        }
    }
}
