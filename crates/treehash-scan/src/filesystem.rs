//! Recursive directory walker.

use std::io;
use std::path::Path;

use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

use treehash_core::{
    ContentHasher, EntryWarning, FileRecord, HashConfig, TreeHashError, WalkOutput, WarningKind,
    is_vcs_path,
};

/// Walks an on-disk directory tree depth-first, in listing order.
///
/// Symlinks are followed. A link back to one of its own ancestors is
/// reported instead of being walked again.
pub struct FilesystemWalker {
    config: HashConfig,
    hasher: ContentHasher,
}

impl FilesystemWalker {
    /// Create a new filesystem walker.
    pub fn new(config: HashConfig) -> Self {
        let hasher = ContentHasher::new(config.algorithm);
        Self { config, hasher }
    }

    /// Walk `dir` and every directory below it.
    ///
    /// Only a failure to list `dir` itself is an error; anything that goes
    /// wrong further down is recorded as a warning and skipped.
    pub fn walk(&self, dir: impl AsRef<Path>) -> Result<WalkOutput, TreeHashError> {
        let dir = dir.as_ref();
        let vcs_dirs = self.config.vcs_dirs.as_slice();
        let entries = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_vcs_entry(entry, vcs_dirs));

        let mut output = WalkOutput::new();
        for entry in entries {
            match entry {
                Ok(entry) if entry.depth() == 0 => {
                    if !entry.file_type().is_dir() {
                        return Err(TreeHashError::directory_read(
                            dir,
                            io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
                        ));
                    }
                }
                Ok(entry) => self.visit_entry(&entry, &mut output),
                // Errors at depth 0 belong to the root itself.
                Err(err) if err.depth() == 0 => {
                    return Err(TreeHashError::directory_read(dir, io::Error::from(err)));
                }
                Err(err) => {
                    let warning = walk_warning(&err);
                    warn!(path = %warning.path, error = %err, "failed to walk entry");
                    output.warnings.push(warning);
                }
            }
        }

        debug!(
            root = %dir.display(),
            files = output.files.len(),
            skipped = output.skipped(),
            "finished directory walk"
        );
        Ok(output)
    }

    fn visit_entry(&self, entry: &DirEntry, output: &mut WalkOutput) {
        let path = entry.path();
        let path_str = path.to_string_lossy();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            trace!(path = %path_str, "entering directory");
            return;
        }
        if !file_type.is_file() {
            // Sockets, FIFOs and devices have no stable contents to hash.
            debug!(path = %path_str, "skipping special file");
            return;
        }

        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(err) => {
                warn!(path = %path_str, error = %err, "failed to read metadata");
                output.warnings.push(EntryWarning::new(
                    path_str,
                    format!("Metadata error: {err}"),
                    WarningKind::MetadataError,
                ));
                return;
            }
        };

        match self.hasher.hash_file(path) {
            Ok(hash) => output
                .files
                .push(FileRecord::new(path_str.as_ref(), size, hash)),
            Err(err) => {
                warn!(path = %path_str, error = %err, "failed to hash file");
                output.warnings.push(hash_warning(&path_str, &err));
            }
        }
    }
}

fn is_vcs_entry<S: AsRef<str>>(entry: &DirEntry, vcs_dirs: &[S]) -> bool {
    is_vcs_path(&entry.file_name().to_string_lossy(), vcs_dirs)
        || is_vcs_path(&entry.path().to_string_lossy(), vcs_dirs)
}

/// Classify an error reported by the walk below the root.
fn walk_warning(err: &walkdir::Error) -> EntryWarning {
    let path = err
        .path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(ancestor) = err.loop_ancestor() {
        return EntryWarning::new(
            path,
            format!("Symlink loop back to {}", ancestor.display()),
            WarningKind::SymlinkLoop,
        );
    }
    if err.path().is_some_and(Path::is_dir) {
        EntryWarning::read_error(path, err)
    } else {
        EntryWarning::new(
            path,
            format!("Metadata error: {err}"),
            WarningKind::MetadataError,
        )
    }
}

fn hash_warning(path: &str, err: &io::Error) -> EntryWarning {
    EntryWarning::new(path, format!("Hash error: {err}"), WarningKind::HashError)
}
