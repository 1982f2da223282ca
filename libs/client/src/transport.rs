//! Client transport to the upload and listing proxies

use async_trait::async_trait;
use bytes::Bytes;
use common::models::{ErrorBody, ListingPage, UploadEnvelope};
use reqwest::{
    Client, Response,
    multipart::{Form, Part},
};
use tracing::{error, info};

use crate::error::ClientError;

/// One file upload as sent to the proxy
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub mime_type: String,
    pub folder: String,
    pub bytes: Bytes,
}

/// Operations the client components need from the proxies
#[async_trait]
pub trait MediaApi: Send + Sync {
    /// Upload one file and return its remote URL
    async fn upload(&self, request: UploadRequest) -> Result<String, ClientError>;

    /// Fetch one listing page
    async fn list(&self, page: u32, limit: u32) -> Result<ListingPage, ClientError>;
}

/// reqwest-backed [`MediaApi`] talking to `{base}/upload` and `{base}/media`
#[derive(Debug, Clone)]
pub struct HttpMediaApi {
    http: Client,
    base_url: String,
}

impl HttpMediaApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn a non-2xx proxy response into `ClientError::Server`
    async fn server_error(response: Response, fallback: &str) -> ClientError {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| fallback.to_string());

        ClientError::Server { status, message }
    }
}

#[async_trait]
impl MediaApi for HttpMediaApi {
    async fn upload(&self, request: UploadRequest) -> Result<String, ClientError> {
        let part = Part::bytes(request.bytes.to_vec())
            .file_name(request.file_name.clone())
            .mime_str(&request.mime_type)?;
        let form = Form::new()
            .part("file", part)
            .text("folder", request.folder.clone());

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = Self::server_error(response, "Failed to upload file").await;
            error!("Upload of {} failed: {}", request.file_name, err);
            return Err(err);
        }

        let envelope: UploadEnvelope = response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        let url = envelope
            .url()
            .ok_or_else(|| ClientError::MalformedResponse("missing data.url".to_string()))?
            .to_string();

        info!("Uploaded {} to {}", request.file_name, url);
        Ok(url)
    }

    async fn list(&self, page: u32, limit: u32) -> Result<ListingPage, ClientError> {
        let response = self
            .http
            .get(self.endpoint("media"))
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response, "Failed to fetch media").await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}
