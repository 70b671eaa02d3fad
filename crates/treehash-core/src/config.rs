//! Hashing configuration types.

use std::fmt;
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::TreeHashError;

/// Environment variable holding the archive entry batch size.
pub const BATCH_SIZE_ENV: &str = "TREEHASH_BATCH_SIZE";

/// Older name for [`BATCH_SIZE_ENV`], still honoured when the new one is unset.
pub const LEGACY_BATCH_SIZE_ENV: &str = "FILE_LIMIT";

/// Environment variable selecting the digest algorithm.
pub const ALGORITHM_ENV: &str = "TREEHASH_ALGORITHM";

/// Digest primitive used for leaf and aggregate hashes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256, the default.
    #[default]
    Sha256,
    /// BLAKE3 with its standard 32-byte output.
    Blake3,
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(format!("unknown digest algorithm '{other}' (expected sha256 or blake3)")),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => f.write_str("sha256"),
            Self::Blake3 => f.write_str("blake3"),
        }
    }
}

/// Configuration shared by the walkers and the aggregator.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct HashConfig {
    /// Number of archive entries materialized per batch.
    #[builder(default = "100")]
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Directory names treated as version-control metadata and skipped.
    #[builder(default = "default_vcs_dirs()")]
    #[serde(default = "default_vcs_dirs")]
    pub vcs_dirs: Vec<String>,

    /// Digest algorithm for leaf and aggregate hashes.
    #[builder(default)]
    #[serde(default)]
    pub algorithm: DigestAlgorithm,

    /// How many archives deep a nested archive may sit.
    #[builder(default = "32")]
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
}

fn default_batch_size() -> usize {
    100
}

fn default_vcs_dirs() -> Vec<String> {
    vec![".git".to_string()]
}

fn default_max_nesting_depth() -> usize {
    32
}

impl HashConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == Some(0) {
            return Err("Batch size must be a positive integer".to_string());
        }
        if let Some(ref dirs) = self.vcs_dirs {
            if dirs.iter().any(|d| d.is_empty() || d.contains(['/', '\\'])) {
                return Err("VCS directory names must be single, non-empty path segments".to_string());
            }
        }
        Ok(())
    }
}

impl HashConfig {
    /// Create a new hash config builder.
    pub fn builder() -> HashConfigBuilder {
        HashConfigBuilder::default()
    }

    /// Defaults overlaid with values from the process environment.
    pub fn from_env() -> Result<Self, TreeHashError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TreeHashError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let batch = lookup(BATCH_SIZE_ENV)
            .map(|v| (BATCH_SIZE_ENV, v))
            .or_else(|| lookup(LEGACY_BATCH_SIZE_ENV).map(|v| (LEGACY_BATCH_SIZE_ENV, v)));
        if let Some((key, value)) = batch {
            config.batch_size = parse_batch_size(&value).map_err(|message| {
                TreeHashError::InvalidConfig {
                    message: format!("{key}: {message}"),
                }
            })?;
        }

        if let Some(value) = lookup(ALGORITHM_ENV) {
            config.algorithm = value
                .parse()
                .map_err(|message: String| TreeHashError::InvalidConfig {
                    message: format!("{ALGORITHM_ENV}: {message}"),
                })?;
        }

        Ok(config)
    }

    /// Replace the batch size, rejecting zero.
    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self, TreeHashError> {
        if batch_size == 0 {
            return Err(TreeHashError::InvalidConfig {
                message: "Batch size must be a positive integer".to_string(),
            });
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    /// Replace the digest algorithm.
    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

fn parse_batch_size(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("batch size must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("'{value}' is not a positive integer ({e})")),
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            vcs_dirs: default_vcs_dirs(),
            algorithm: DigestAlgorithm::default(),
            max_nesting_depth: default_max_nesting_depth(),
        }
    }
}
