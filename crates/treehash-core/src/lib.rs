//! Core types for treehash.
//!
//! This crate provides the fundamental pieces shared by the walkers and the
//! aggregator: per-file records, the content hasher, configuration and the
//! error taxonomy.

mod config;
mod error;
mod hasher;
mod record;
mod vcs;

pub use config::{
    ALGORITHM_ENV, BATCH_SIZE_ENV, DigestAlgorithm, HashConfig, HashConfigBuilder,
    LEGACY_BATCH_SIZE_ENV,
};
pub use error::{EntryWarning, TreeHashError, WarningKind};
pub use hasher::ContentHasher;
pub use record::{
    AggregateResult, ContentHash, EncryptionType, FileRecord, WalkOutput, extension_of,
};
pub use vcs::is_vcs_path;
