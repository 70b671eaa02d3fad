//! Order-independent digest over a walked tree.

use serde_json::Value;
use tracing::debug;

use treehash_core::{
    AggregateResult, ContentHasher, FileRecord, HashConfig, TreeHashError, WalkOutput,
};
use treehash_scan::{ArchiveWalker, FilesystemWalker};

use crate::source::Source;

/// Dispatches a source to its walker and folds the leaf hashes into one digest.
pub struct TreeAggregator {
    config: HashConfig,
    hasher: ContentHasher,
}

impl TreeAggregator {
    /// Create a new aggregator.
    pub fn new(config: HashConfig) -> Self {
        let hasher = ContentHasher::new(config.algorithm);
        Self { config, hasher }
    }

    /// Walk `source` and compute its aggregate digest.
    ///
    /// Fatal walk errors are returned as-is; no digest is computed over a
    /// partial tree.
    pub fn aggregate(&self, source: Source) -> Result<AggregateResult, TreeHashError> {
        let output = self.walk(source)?;
        let total_hash = self.aggregate_records(&output.files);
        let skipped = output.skipped();
        debug!(files = output.files.len(), skipped, %total_hash, "aggregated tree");

        Ok(AggregateResult {
            total_hash,
            files: Some(output.files),
            skipped,
        })
    }

    /// Like [`aggregate`](Self::aggregate) for an untyped source.
    pub fn aggregate_value(&self, value: Value) -> Result<AggregateResult, TreeHashError> {
        self.aggregate(Source::try_from(value)?)
    }

    /// Walk `source` with the walker matching its kind.
    pub fn walk(&self, source: Source) -> Result<WalkOutput, TreeHashError> {
        match source {
            Source::Path(path) => {
                debug!(path = %path.display(), "walking directory");
                FilesystemWalker::new(self.config.clone()).walk(&path)
            }
            Source::Archive(upload) if !upload.is_buffer_bearing() => {
                Err(TreeHashError::invalid_source(format!(
                    "upload {} has neither a path nor any bytes",
                    upload.name
                )))
            }
            Source::Archive(upload) => {
                let walker = ArchiveWalker::new(self.config.clone());
                match upload.path {
                    Some(path) => {
                        debug!(name = %upload.name, path = %path.display(), "walking archive on disk");
                        walker.walk_path(&path)
                    }
                    None => {
                        debug!(name = %upload.name, bytes = upload.bytes.len(), "walking archive in memory");
                        walker.walk_bytes(&upload.name, &upload.bytes)
                    }
                }
            }
        }
    }

    /// Digest over the sorted concatenation of the records' hex hashes.
    pub fn aggregate_records(&self, files: &[FileRecord]) -> String {
        let mut hashes: Vec<&str> = files.iter().map(|f| f.hash.as_str()).collect();
        hashes.sort_unstable();
        self.hasher.hash_hex(hashes.concat().as_bytes())
    }
}

impl Default for TreeAggregator {
    fn default() -> Self {
        Self::new(HashConfig::default())
    }
}
