//! Error types for hashing operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a whole hashing call.
///
/// None of these ever come with a partial result: a caller that sees an
/// error must not report a digest.
#[derive(Debug, Error)]
pub enum TreeHashError {
    /// The source is neither a path nor a buffer-bearing upload.
    #[error("Invalid source type: {message}")]
    InvalidSourceType { message: String },

    /// The archive container could not be opened at all.
    #[error("Failed to open archive {name}: {source}")]
    ArchiveOpen {
        name: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// The top-level directory could not be listed.
    #[error("Failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl TreeHashError {
    /// Create an archive-open error for the named source.
    pub fn archive_open(name: impl Into<String>, source: zip::result::ZipError) -> Self {
        Self::ArchiveOpen {
            name: name.into(),
            source,
        }
    }

    /// Create a directory-read error with path context.
    pub fn directory_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryRead {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid-source-type error.
    pub fn invalid_source(message: impl Into<String>) -> Self {
        Self::InvalidSourceType {
            message: message.into(),
        }
    }
}

/// Kind of recovered per-entry failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Entry bytes could not be read or decompressed.
    ReadError,
    /// Entry metadata could not be read.
    MetadataError,
    /// File contents could not be hashed.
    HashError,
    /// A directory entry carried a payload that is not a valid archive.
    NestedArchive,
    /// Nested archives went deeper than the configured limit.
    NestingTooDeep,
    /// A followed symlink points back at one of its own ancestors.
    SymlinkLoop,
}

/// Entry skipped during a walk. The walk itself carried on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryWarning {
    /// Path (or archive-relative name) of the skipped entry.
    pub path: String,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl EntryWarning {
    /// Create a new entry warning.
    pub fn new(path: impl Into<String>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::new(path, format!("Read error: {error}"), WarningKind::ReadError)
    }
}
