//! Hashing sources and their loosely typed boundary form.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use treehash_core::TreeHashError;

/// Something that can be hashed as a tree.
#[derive(Debug, Clone)]
pub enum Source {
    /// A directory on local storage.
    Path(PathBuf),
    /// An uploaded zip archive.
    Archive(UploadedArchive),
}

/// An uploaded archive, held in memory or already written to disk.
#[derive(Debug, Clone)]
pub struct UploadedArchive {
    /// Name the upload arrived under, used in logs and errors.
    pub name: String,
    /// Raw archive bytes. Ignored when `path` is set.
    pub bytes: Vec<u8>,
    /// Location of the archive on disk, if it has been stored there.
    pub path: Option<PathBuf>,
}

impl UploadedArchive {
    /// An archive held in memory.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            path: None,
        }
    }

    /// An archive already materialized on disk.
    pub fn on_disk(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            bytes: Vec::new(),
            path: Some(path.into()),
        }
    }

    /// Whether there is anything to open: a stored file or a non-empty buffer.
    pub fn is_buffer_bearing(&self) -> bool {
        self.path.is_some() || !self.bytes.is_empty()
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<UploadedArchive> for Source {
    fn from(upload: UploadedArchive) -> Self {
        Self::Archive(upload)
    }
}

/// Upload record as it arrives from an untyped caller.
#[derive(Debug, Deserialize)]
struct UploadDescriptor {
    #[serde(default, alias = "originalname")]
    name: Option<String>,
    #[serde(default)]
    buffer: Option<BufferField>,
    #[serde(default)]
    path: Option<PathBuf>,
}

/// Either a plain byte array or a `{ "type": "Buffer", "data": [...] }` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BufferField {
    Raw(Vec<u8>),
    Tagged { data: Vec<u8> },
}

impl TryFrom<Value> for Source {
    type Error = TreeHashError;

    /// A JSON string is a directory path; an object carrying a `buffer` byte
    /// array and/or a `path` is an uploaded archive. Anything else is rejected.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(path) => Ok(Self::Path(PathBuf::from(path))),
            Value::Object(_) => {
                let descriptor: UploadDescriptor = serde_json::from_value(value).map_err(|e| {
                    TreeHashError::invalid_source(format!("malformed upload record: {e}"))
                })?;

                let bytes = match descriptor.buffer {
                    Some(BufferField::Raw(bytes)) | Some(BufferField::Tagged { data: bytes }) => {
                        Some(bytes)
                    }
                    None => None,
                };
                if bytes.as_ref().is_none_or(Vec::is_empty) && descriptor.path.is_none() {
                    return Err(TreeHashError::invalid_source(
                        "upload record has neither a buffer nor a path",
                    ));
                }

                let name = descriptor
                    .name
                    .or_else(|| {
                        descriptor
                            .path
                            .as_ref()
                            .map(|p| p.display().to_string())
                    })
                    .unwrap_or_else(|| "upload".to_string());

                Ok(Self::Archive(UploadedArchive {
                    name,
                    bytes: bytes.unwrap_or_default(),
                    path: descriptor.path,
                }))
            }
            other => Err(TreeHashError::invalid_source(format!(
                "expected a path string or an object with a buffer, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
