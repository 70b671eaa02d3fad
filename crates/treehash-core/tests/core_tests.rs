use std::fs;

use tempfile::TempDir;
use treehash_core::{
    AggregateResult, ContentHash, ContentHasher, DigestAlgorithm, EncryptionType, EntryWarning,
    FileRecord, HashConfig, TreeHashError, WalkOutput, WarningKind, extension_of, is_vcs_path,
};

#[test]
fn test_content_hash_creation_and_hex() {
    let hash = ContentHash::new([0xab; 32]);

    let hex = hash.to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    assert_eq!(hash, ContentHash::new([0xab; 32]));
    assert_ne!(hash, ContentHash::new([0xcd; 32]));
}

#[test]
fn test_hex_order_matches_byte_order() {
    let low = ContentHash::new([0x0f; 32]);
    let high = ContentHash::new([0xf0; 32]);
    assert!(low < high);
    assert!(low.to_hex() < high.to_hex());
}

#[test]
fn test_hasher_file_and_buffer_agree() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data.bin");
    fs::write(&path, b"the same bytes either way").unwrap();

    let hasher = ContentHasher::default();
    assert_eq!(hasher.algorithm(), DigestAlgorithm::Sha256);
    assert_eq!(
        hasher.hash_file(&path).unwrap(),
        hasher.hash_bytes(b"the same bytes either way")
    );
}

#[test]
fn test_hash_ignores_name_and_location() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("elsewhere")).unwrap();
    fs::write(temp.path().join("one.txt"), "identical").unwrap();
    fs::write(temp.path().join("elsewhere/two.md"), "identical").unwrap();

    let hasher = ContentHasher::default();
    assert_eq!(
        hasher.hash_file(temp.path().join("one.txt")).unwrap(),
        hasher.hash_file(temp.path().join("elsewhere/two.md")).unwrap()
    );
}

#[test]
fn test_file_record_fields() {
    let hash = ContentHasher::default().hash_bytes(b"hello");
    let record = FileRecord::new("project/src/lib.rs", 5, hash);

    assert_eq!(record.file_path, "project/src/lib.rs");
    assert_eq!(record.file_size, 5);
    assert_eq!(record.file_extension, ".rs");
    assert!(!record.encrypted);
    assert_eq!(record.encryption_type, EncryptionType::None);
    assert_eq!(
        record.hash,
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

#[test]
fn test_file_record_roundtrips_through_json() {
    let record = FileRecord::new("a/b.tar.gz", 10, ContentHash::new([7; 32]));
    let json = serde_json::to_string(&record).unwrap();
    let back: FileRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn test_extension_edge_cases() {
    assert_eq!(extension_of("a/b/c"), "");
    assert_eq!(extension_of(".env"), "");
    assert_eq!(extension_of("dir.d/file"), "");
    assert_eq!(extension_of("dir/"), "");
    assert_eq!(extension_of("x.JSON"), ".JSON");
}

#[test]
fn test_vcs_path_helper() {
    let dirs = HashConfig::default().vcs_dirs;
    assert!(is_vcs_path("a/.git/b", &dirs));
    assert!(!is_vcs_path("a/.gitkeep", &dirs));
}

#[test]
fn test_walk_output_skipped_count() {
    let mut output = WalkOutput::new();
    output.warnings.push(EntryWarning::new("x", "boom", WarningKind::HashError));
    output.warnings.push(EntryWarning::read_error("y", "boom"));
    assert_eq!(output.skipped(), 2);
}

#[test]
fn test_aggregate_result_total_size() {
    let result = AggregateResult {
        total_hash: "00".repeat(32),
        files: Some(vec![
            FileRecord::new("a", 3, ContentHash::new([1; 32])),
            FileRecord::new("b", 4, ContentHash::new([2; 32])),
        ]),
        skipped: 0,
    };
    assert_eq!(result.total_size(), Some(7));
    assert_eq!(result.without_files().total_size(), None);
}

#[test]
fn test_config_with_batch_size() {
    let config = HashConfig::default().with_batch_size(1).unwrap();
    assert_eq!(config.batch_size, 1);

    let err = HashConfig::default().with_batch_size(0).unwrap_err();
    assert!(matches!(err, TreeHashError::InvalidConfig { .. }));
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: HashConfig = serde_json::from_str(r#"{ "batch_size": 5 }"#).unwrap();
    assert_eq!(config.batch_size, 5);
    assert_eq!(config.vcs_dirs, vec![".git".to_string()]);
    assert_eq!(config.algorithm, DigestAlgorithm::Sha256);
    assert_eq!(config.max_nesting_depth, 32);
}
