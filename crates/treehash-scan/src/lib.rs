//! Tree walkers for treehash.
//!
//! This crate turns a source tree into a flat list of [`FileRecord`]s, one per
//! leaf, each carrying the digest of that leaf's bytes.
//!
//! # Overview
//!
//! Two walkers share the same output shape:
//!
//! - [`FilesystemWalker`] descends an on-disk directory tree, following
//!   symlinks but never back into one of their own ancestors
//! - [`ArchiveWalker`] opens a zip archive (from disk or memory), processes
//!   its entries in fixed-size batches and expands nested archives
//!
//! Both skip version-control metadata directories and recover from failures
//! on individual entries: the entry is logged, recorded as an
//! [`EntryWarning`] and left out, and the walk carries on. Only a failure to
//! open the top-level source aborts the call.
//!
//! # Example
//!
//! ```rust,no_run
//! use treehash_scan::{ArchiveWalker, FilesystemWalker, HashConfig};
//!
//! let config = HashConfig::default();
//!
//! let tree = FilesystemWalker::new(config.clone()).walk("/path/to/project").unwrap();
//! println!("{} files, {} skipped", tree.files.len(), tree.skipped());
//!
//! let upload = std::fs::read("/path/to/upload.zip").unwrap();
//! let archive = ArchiveWalker::new(config).walk_bytes("upload.zip", &upload).unwrap();
//! for file in &archive.files {
//!     println!("{} {}", file.hash, file.file_path);
//! }
//! ```

mod archive;
mod filesystem;

pub use archive::ArchiveWalker;
pub use filesystem::FilesystemWalker;

// Re-export core types for convenience
pub use treehash_core::{
    ContentHasher, EntryWarning, FileRecord, HashConfig, TreeHashError, WalkOutput, WarningKind,
};
