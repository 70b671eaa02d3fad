//! Tree digests for treehash.
//!
//! [`TreeAggregator`] takes a [`Source`] (a directory path or an uploaded
//! archive), walks it with the matching walker and folds the per-file hashes
//! into one digest:
//!
//! 1. collect the hex hash of every leaf
//! 2. sort the hashes in ascending lexicographic order
//! 3. concatenate them without a separator and hash the result
//!
//! Sorting makes the digest independent of traversal order. Duplicate hashes
//! are kept, so two identical files count twice.
//!
//! ```rust,no_run
//! use treehash_aggregate::{Source, TreeAggregator, UploadedArchive};
//! use treehash_core::HashConfig;
//!
//! let aggregator = TreeAggregator::new(HashConfig::default());
//!
//! let dir = aggregator.aggregate(Source::from("/path/to/project")).unwrap();
//! println!("{}", dir.total_hash);
//!
//! let bytes = std::fs::read("/path/to/upload.zip").unwrap();
//! let upload = aggregator
//!     .aggregate(UploadedArchive::from_bytes("upload.zip", bytes).into())
//!     .unwrap();
//! println!("{} ({} skipped)", upload.total_hash, upload.skipped);
//! ```

mod aggregator;
mod source;

pub use aggregator::TreeAggregator;
pub use source::{Source, UploadedArchive};

// Re-export core types
pub use treehash_core::{AggregateResult, FileRecord, HashConfig, TreeHashError};
