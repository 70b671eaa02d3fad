//! Per-file records and walk results.

use std::path::Path;

use compact_str::{CompactString, format_compact};
use serde::{Deserialize, Serialize};

use crate::error::EntryWarning;

/// 32-byte content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Encryption applied to an entry.
///
/// Only `None` exists today; the variant is carried so the record format can
/// grow without changing shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptionType {
    #[default]
    None,
}

impl EncryptionType {
    /// Whether entries tagged with this type are encrypted.
    pub fn is_encrypted(&self) -> bool {
        match self {
            Self::None => false,
        }
    }
}

/// One leaf entry discovered during a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Filesystem path or archive-relative name.
    pub file_path: CompactString,
    /// Size in bytes.
    pub file_size: u64,
    /// Extension including the leading dot, or empty.
    pub file_extension: CompactString,
    pub encrypted: bool,
    pub encryption_type: EncryptionType,
    /// Lowercase hex digest of the entry's bytes.
    pub hash: String,
}

impl FileRecord {
    /// Create a record for an unencrypted entry.
    pub fn new(file_path: impl Into<CompactString>, file_size: u64, hash: ContentHash) -> Self {
        let file_path = file_path.into();
        let file_extension = extension_of(&file_path);
        let encryption_type = EncryptionType::None;
        Self {
            file_path,
            file_size,
            file_extension,
            encrypted: encryption_type.is_encrypted(),
            encryption_type,
            hash: hash.to_hex(),
        }
    }
}

/// Extension of the last path segment, with its leading dot.
///
/// A name that only starts with a dot (`.bashrc`) has no extension, and a
/// trailing dot (`name.`) yields `"."`.
pub fn extension_of(path: &str) -> CompactString {
    let name = path
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    match Path::new(name).extension() {
        Some(ext) => format_compact!(".{}", ext.to_string_lossy()),
        None => CompactString::default(),
    }
}

/// Flat result of a single walk, including any recursive descents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkOutput {
    /// Records in visit order.
    pub files: Vec<FileRecord>,
    /// Entries skipped because of recovered failures.
    pub warnings: Vec<EntryWarning>,
}

impl WalkOutput {
    /// Create an empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append another walk's records and warnings after this one's.
    pub fn append(&mut self, mut other: WalkOutput) {
        self.files.append(&mut other.files);
        self.warnings.append(&mut other.warnings);
    }

    /// Number of entries skipped because of recovered failures.
    pub fn skipped(&self) -> usize {
        self.warnings.len()
    }
}

/// Final digest over a traversed tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Digest over the sorted concatenation of all leaf hashes.
    pub total_hash: String,
    /// Leaf records, kept for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileRecord>>,
    /// Entries left out because of recovered failures.
    #[serde(default)]
    pub skipped: usize,
}

impl AggregateResult {
    /// Drop the record list, keeping only the digest and counters.
    pub fn without_files(mut self) -> Self {
        self.files = None;
        self
    }

    /// Total size of all hashed leaves, when the records were kept.
    pub fn total_size(&self) -> Option<u64> {
        self.files
            .as_ref()
            .map(|files| files.iter().map(|f| f.file_size).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_hex() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert!(hash.to_hex().starts_with("abab"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("src/main.rs"), ".rs");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("Makefile"), "");
        assert_eq!(extension_of("home/.bashrc"), "");
        assert_eq!(extension_of("notes."), ".");
        assert_eq!(extension_of("v1.2/README"), "");
        assert_eq!(extension_of(r"dir\file.TXT"), ".TXT");
    }

    #[test]
    fn test_record_has_inert_encryption_fields() {
        let record = FileRecord::new("a/b.txt", 5, ContentHash::new([0; 32]));
        assert!(!record.encrypted);
        assert_eq!(record.encryption_type, EncryptionType::None);
        assert_eq!(record.file_extension, ".txt");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = FileRecord::new("a.txt", 5, ContentHash::new([0x11; 32]));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["filePath"], "a.txt");
        assert_eq!(json["fileSize"], 5);
        assert_eq!(json["fileExtension"], ".txt");
        assert_eq!(json["encrypted"], false);
        assert_eq!(json["encryptionType"], "None");
        assert_eq!(json["hash"], "11".repeat(32));
    }

    #[test]
    fn test_walk_output_append() {
        let mut first = WalkOutput::new();
        first.files.push(FileRecord::new("a", 1, ContentHash::new([1; 32])));
        let mut second = WalkOutput::new();
        second.files.push(FileRecord::new("b", 2, ContentHash::new([2; 32])));
        second.warnings.push(EntryWarning::read_error("c", "boom"));

        first.append(second);
        assert_eq!(first.files.len(), 2);
        assert_eq!(first.files[1].file_path, "b");
        assert_eq!(first.skipped(), 1);
    }
}
