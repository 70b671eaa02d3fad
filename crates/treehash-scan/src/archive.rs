//! Zip archive walker with nested archive expansion.
//!
//! # Nested container convention
//!
//! Uploaded archives may embed a complete child archive as the payload of a
//! *directory* entry. A directory entry that materializes to a non-empty
//! payload is therefore opened as an archive in its own right and its leaves
//! are merged into the parent's output. Directory entries without a payload
//! are ordinary empty directories and contribute nothing.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use itertools::Itertools;
use tracing::{debug, trace, warn};
use zip::ZipArchive;
use zip::result::{ZipError, ZipResult};

use treehash_core::{
    ContentHash, ContentHasher, EntryWarning, FileRecord, HashConfig, TreeHashError, WalkOutput,
    WarningKind, is_vcs_path,
};

/// Upper bound on the up-front allocation for a directory payload.
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// Walks zip archives, batch by batch, recursing into nested archives.
pub struct ArchiveWalker {
    config: HashConfig,
    hasher: ContentHasher,
}

/// What a single entry turned out to be once opened.
enum Materialized {
    Leaf { size: u64, hash: ContentHash },
    Directory { payload: Vec<u8> },
}

impl ArchiveWalker {
    /// Create a new archive walker.
    pub fn new(config: HashConfig) -> Self {
        let hasher = ContentHasher::new(config.algorithm);
        Self { config, hasher }
    }

    /// Walk an archive stored on disk.
    pub fn walk_path(&self, path: impl AsRef<Path>) -> Result<WalkOutput, TreeHashError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file =
            File::open(path).map_err(|e| TreeHashError::archive_open(&name, ZipError::Io(e)))?;
        self.walk_reader(&name, BufReader::new(file), 0)
    }

    /// Walk an archive held in memory.
    pub fn walk_bytes(&self, name: &str, bytes: &[u8]) -> Result<WalkOutput, TreeHashError> {
        self.walk_reader(name, Cursor::new(bytes), 0)
    }

    fn walk_reader<R: Read + Seek>(
        &self,
        name: &str,
        reader: R,
        depth: usize,
    ) -> Result<WalkOutput, TreeHashError> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| TreeHashError::archive_open(name, e))?;
        let entry_count = archive.len();
        let batch_size = self.config.batch_size.max(1);
        debug!(archive = name, entries = entry_count, depth, "opened archive");

        let mut output = WalkOutput::new();
        let batches = (0..entry_count).chunks(batch_size);
        for (batch_no, batch) in batches.into_iter().enumerate() {
            debug!(archive = name, batch = batch_no, "processing batch");
            for index in batch {
                self.visit_entry(&mut archive, index, depth, &mut output);
            }
        }

        debug!(
            archive = name,
            files = output.files.len(),
            skipped = output.skipped(),
            "finished archive"
        );
        Ok(output)
    }

    /// Process one entry. Failures are recorded and never propagate.
    fn visit_entry<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        index: usize,
        depth: usize,
        output: &mut WalkOutput,
    ) {
        let name = archive
            .name_for_index(index)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("#{index}"));

        if is_vcs_path(&name, &self.config.vcs_dirs) {
            trace!(entry = %name, "skipping version-control metadata");
            return;
        }

        let materialized = match self.materialize(archive, index) {
            Ok(m) => m,
            Err(err) => {
                warn!(entry = %name, error = %err, "failed to read archive entry");
                output.warnings.push(EntryWarning::read_error(name, err));
                return;
            }
        };

        match materialized {
            Materialized::Leaf { size, hash } => {
                output.files.push(FileRecord::new(name, size, hash));
            }
            Materialized::Directory { payload } if payload.is_empty() => {}
            Materialized::Directory { payload } => self.descend(&name, payload, depth, output),
        }
    }

    /// Open an entry and either hash it or pull out its directory payload.
    fn materialize<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        index: usize,
    ) -> ZipResult<Materialized> {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            let mut payload = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
            entry.read_to_end(&mut payload)?;
            Ok(Materialized::Directory { payload })
        } else {
            let size = entry.size();
            let hash = self.hasher.hash_reader(&mut entry)?;
            Ok(Materialized::Leaf { size, hash })
        }
    }

    /// Expand a directory payload as a nested archive.
    fn descend(&self, name: &str, payload: Vec<u8>, depth: usize, output: &mut WalkOutput) {
        let nested_depth = depth + 1;
        if nested_depth > self.config.max_nesting_depth {
            warn!(entry = name, depth = nested_depth, "nested archive too deep");
            output.warnings.push(EntryWarning::new(
                name,
                format!(
                    "Nested archive exceeds depth limit of {}",
                    self.config.max_nesting_depth
                ),
                WarningKind::NestingTooDeep,
            ));
            return;
        }

        debug!(entry = name, bytes = payload.len(), "descending into nested archive");
        match self.walk_reader(name, Cursor::new(payload), nested_depth) {
            Ok(nested) => output.append(nested),
            Err(err) => {
                warn!(entry = name, error = %err, "directory payload is not a readable archive");
                output.warnings.push(EntryWarning::new(
                    name,
                    err.to_string(),
                    WarningKind::NestedArchive,
                ));
            }
        }
    }
}
