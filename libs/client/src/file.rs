//! File capability used by the upload widget
//!
//! Anything that can name itself, report a MIME type and size, and produce
//! its bytes can be uploaded: a dropped browser file, a native dialog pick,
//! or an in-memory payload.

use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use bytes::Bytes;
use common::models::AcceptFilter;

use crate::error::ValidationError;

/// Fallback MIME type for unknown extensions
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A file the user selected or dropped
#[async_trait]
pub trait FileSource: Send + Sync {
    fn name(&self) -> &str;

    fn mime_type(&self) -> &str;

    /// Size in bytes
    fn size(&self) -> u64;

    async fn read(&self) -> io::Result<Bytes>;
}

/// Local constraints checked before a file may be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConstraints {
    pub accept: AcceptFilter,
    pub max_size: u64,
}

impl UploadConstraints {
    pub fn validate(&self, file: &dyn FileSource) -> Result<(), ValidationError> {
        if file.size() > self.max_size {
            return Err(ValidationError::TooLarge {
                size: file.size(),
                max: self.max_size,
            });
        }

        if !self.accept.accepts_mime(file.mime_type()) {
            return Err(ValidationError::UnsupportedType {
                mime: file.mime_type().to_string(),
            });
        }

        Ok(())
    }
}

/// An in-memory file
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    mime_type: String,
    data: Bytes,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

#[async_trait]
impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    async fn read(&self) -> io::Result<Bytes> {
        Ok(self.data.clone())
    }
}

/// A file on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    mime_type: String,
    size: u64,
}

impl LocalFile {
    /// Stat `path`, inferring the MIME type from its extension
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(mime_for_extension)
            .unwrap_or(OCTET_STREAM)
            .to_string();

        Ok(Self {
            path,
            name,
            mime_type,
            size: metadata.len(),
        })
    }
}

#[async_trait]
impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.size
    }

    async fn read(&self) -> io::Result<Bytes> {
        Ok(Bytes::from(tokio::fs::read(&self.path).await?))
    }
}

/// MIME type for the image and video extensions the widget knows about
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => OCTET_STREAM,
    }
}
