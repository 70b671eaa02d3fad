//! Content hashing for buffers and files.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::config::DigestAlgorithm;
use crate::record::ContentHash;

/// Size of the read buffer used when hashing files.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Stateless digest computation over bytes and files.
///
/// Hashing a file yields exactly the digest of its contents as a buffer, so
/// leaves read from disk and leaves extracted from an archive agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher {
    algorithm: DigestAlgorithm,
}

impl ContentHasher {
    /// Create a hasher for the given algorithm.
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Algorithm this hasher uses.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Digest of a byte sequence.
    pub fn hash_bytes(&self, bytes: &[u8]) -> ContentHash {
        match self.algorithm {
            DigestAlgorithm::Sha256 => ContentHash::new(Sha256::digest(bytes).into()),
            DigestAlgorithm::Blake3 => ContentHash::new(*blake3::hash(bytes).as_bytes()),
        }
    }

    /// Lowercase hex digest of a byte sequence.
    pub fn hash_hex(&self, bytes: &[u8]) -> String {
        self.hash_bytes(bytes).to_hex()
    }

    /// Digest of a file's contents, read in fixed-size chunks.
    pub fn hash_file(&self, path: impl AsRef<Path>) -> io::Result<ContentHash> {
        let file = File::open(path.as_ref())?;
        self.hash_reader(file)
    }

    /// Digest of everything a reader yields.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<ContentHash> {
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        match self.algorithm {
            DigestAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                loop {
                    let bytes_read = read_chunk(&mut reader, &mut buffer)?;
                    if bytes_read == 0 {
                        break;
                    }
                    hasher.update(&buffer[..bytes_read]);
                }
                Ok(ContentHash::new(hasher.finalize().into()))
            }
            DigestAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                loop {
                    let bytes_read = read_chunk(&mut reader, &mut buffer)?;
                    if bytes_read == 0 {
                        break;
                    }
                    hasher.update(&buffer[..bytes_read]);
                }
                Ok(ContentHash::new(*hasher.finalize().as_bytes()))
            }
        }
    }
}

fn read_chunk<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buffer) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}
