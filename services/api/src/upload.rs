//! Upload proxy: one multipart file in, one remote PUT out
//!
//! The file part is spooled to a temporary file owned by the request. That
//! file is removed on every exit path: explicitly once the remote call has
//! settled, and by `Drop` when the handler bails out earlier.

use std::{
    io,
    path::{Path, PathBuf},
};

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use bytes::Bytes;
use common::{PutObject, models::UploadEnvelope, storage_key::storage_key};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// An uploaded file part spooled to disk
#[derive(Debug)]
pub struct SpooledFile {
    path: Option<TempPath>,
    file_name: Option<String>,
    content_type: Option<String>,
    size: u64,
}

impl SpooledFile {
    /// Create an empty spool file in `dir` and return it with a writer
    pub fn create(
        dir: &Path,
        file_name: Option<String>,
        content_type: Option<String>,
    ) -> io::Result<(Self, tokio::fs::File)> {
        let (file, path) = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(dir)?
            .into_parts();

        let spooled = Self {
            path: Some(path),
            file_name,
            content_type,
            size: 0,
        };

        Ok((spooled, tokio::fs::File::from_std(file)))
    }

    async fn from_field(mut field: Field<'_>, dir: &Path) -> ApiResult<Self> {
        let (mut spooled, mut writer) = Self::create(
            dir,
            field.file_name().map(str::to_string),
            field.content_type().map(str::to_string),
        )?;

        while let Some(chunk) = field.chunk().await? {
            writer.write_all(&chunk).await?;
            spooled.size += chunk.len() as u64;
        }
        writer.flush().await?;

        Ok(spooled)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Location of the spool file, `None` once cleaned up
    pub fn path(&self) -> Option<PathBuf> {
        self.path.as_ref().map(|p| p.to_path_buf())
    }

    /// Read the whole spooled file into memory
    pub async fn read(&self) -> io::Result<Bytes> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "upload already cleaned up"))?;
        Ok(Bytes::from(tokio::fs::read(path).await?))
    }

    /// Delete the spool file. Calling it again is a no-op.
    pub fn cleanup(&mut self) -> io::Result<()> {
        match self.path.take() {
            Some(path) => match path.close() {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
            None => Ok(()),
        }
    }
}

impl Drop for SpooledFile {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            warn!("Failed to remove temporary upload file: {}", e);
        }
    }
}

/// Parsed upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<SpooledFile>,
    pub folder: Option<String>,
}

impl UploadForm {
    /// Read the multipart body, spooling the single `file` part into `dir`
    pub async fn parse(mut multipart: Multipart, dir: &Path) -> ApiResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("file") => {
                    if form.file.is_some() {
                        return Err(ApiError::TooManyFiles);
                    }
                    tokio::fs::create_dir_all(dir).await?;
                    form.file = Some(SpooledFile::from_field(field, dir).await?);
                }
                Some("folder") => form.folder = Some(field.text().await?),
                other => debug!("Ignoring multipart field {:?}", other),
            }
        }

        Ok(form)
    }
}

/// `POST /upload`
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let api_key = state.config.api_key().map_err(ApiError::upload)?;
    let multipart = multipart?;

    let UploadForm { file, folder } = UploadForm::parse(multipart, &state.config.temp_dir()).await?;
    let mut file = file.ok_or(ApiError::MissingFile)?;

    let key = storage_key(folder.as_deref(), file.file_name());
    let outcome = forward(&state, api_key, &key, &file).await;

    if let Err(e) = file.cleanup() {
        warn!("Failed to remove temporary upload file for {}: {}", key, e);
    }

    let envelope = outcome?;
    info!("Upload stored at {}", key);
    Ok((StatusCode::CREATED, Json(envelope)))
}

async fn forward(
    state: &AppState,
    api_key: &str,
    key: &str,
    file: &SpooledFile,
) -> ApiResult<UploadEnvelope> {
    let body = file.read().await?;
    debug!("Read {} bytes of spooled upload for {}", file.size(), key);

    state
        .remote
        .put_object(api_key, PutObject::new(key, file.content_type(), body))
        .await
        .map_err(ApiError::upload)
}
