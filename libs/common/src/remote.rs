//! Client for the remote object-storage API
//!
//! The proxies only talk to the remote service through the [`RemoteStorage`]
//! trait, so the HTTP implementation can be swapped for an in-process fake.
//! Every non-2xx answer is normalized into [`StorageError::Upstream`] here.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url, header::CONTENT_TYPE};
use serde_json::Value;
use tracing::{error, info};

use crate::{
    config::StorageConfig,
    error::{StorageError, StorageResult},
    models::UploadEnvelope,
};

/// Content type sent when the upload does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A single object write
#[derive(Debug, Clone)]
pub struct PutObject {
    /// Remote key, `folder/sanitizedFilename`
    pub key: String,
    pub content_type: String,
    pub body: Bytes,
}

impl PutObject {
    pub fn new(key: impl Into<String>, content_type: Option<&str>, body: Bytes) -> Self {
        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        Self {
            key: key.into(),
            content_type,
            body,
        }
    }
}

/// Remote storage operations used by the proxies
#[async_trait]
pub trait RemoteStorage: Send + Sync {
    /// PUT one object and return the remote `{meta, data, error}` envelope
    async fn put_object(&self, api_key: &str, object: PutObject) -> StorageResult<UploadEnvelope>;

    /// Fetch one listing page, returned exactly as the remote sent it
    async fn list_media(&self, api_key: &str, page: u32, limit: u32) -> StorageResult<Value>;
}

/// HTTP implementation of [`RemoteStorage`]
#[derive(Debug, Clone)]
pub struct HttpRemoteStorage {
    http: Client,
    upload_url: Url,
    listing_url: Url,
}

impl HttpRemoteStorage {
    /// Create a client for the endpoints named in `config`
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: &StorageConfig) -> StorageResult<Self> {
        let parse = |raw: &str| {
            Url::parse(raw).map_err(|e| StorageError::InvalidUrl(format!("{}: {}", raw, e)))
        };

        let upload_url = parse(&config.upload_url)?;
        if upload_url.cannot_be_a_base() {
            return Err(StorageError::InvalidUrl(config.upload_url.clone()));
        }

        Ok(Self {
            http,
            upload_url,
            listing_url: parse(&config.listing_url)?,
        })
    }

    /// URL of `key` under the upload base, one percent-encoded segment per key part
    pub fn object_url(&self, key: &str) -> Url {
        let mut url = self.upload_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(key.split('/'));
        }
        url
    }

    async fn read_error_body(response: reqwest::Response) -> Value {
        response.json::<Value>().await.unwrap_or(Value::Null)
    }
}

#[async_trait]
impl RemoteStorage for HttpRemoteStorage {
    async fn put_object(&self, api_key: &str, object: PutObject) -> StorageResult<UploadEnvelope> {
        let url = self.object_url(&object.key);
        info!(
            "Uploading to remote storage: path={} size={} content_type={}",
            object.key,
            object.body.len(),
            object.content_type
        );

        let response = self
            .http
            .put(url)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, object.content_type)
            .body(object.body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = Self::read_error_body(response).await;
            error!(
                "Remote storage upload failed: status={} reason={} error={}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                body
            );
            return Err(StorageError::upstream(
                status,
                &body,
                "Failed to upload to remote storage",
            ));
        }

        let bytes = response.bytes().await?;
        let envelope: UploadEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        info!("Remote storage upload succeeded: path={}", object.key);
        Ok(envelope)
    }

    async fn list_media(&self, api_key: &str, page: u32, limit: u32) -> StorageResult<Value> {
        let mut url = self.listing_url.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());

        let response = self.http.get(url).bearer_auth(api_key).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = Self::read_error_body(response).await;
            error!(
                "Remote storage listing failed: status={} reason={} error={}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                body
            );
            return Err(StorageError::upstream(status, &body, "Failed to fetch media"));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| StorageError::InvalidResponse(e.to_string()))
    }
}
