//! Shared fixtures for handler tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::Body, response::Response};
use common::{
    PutObject, RemoteStorage, StorageConfig, StorageError, StorageResult,
    models::UploadEnvelope,
};
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::state::AppState;

/// In-process stand-in for the remote storage API
#[derive(Default)]
pub struct FakeRemote {
    upload_url: String,
    upload_error: Mutex<Option<StorageError>>,
    listing: Value,
    listing_error: Mutex<Option<StorageError>>,
    puts: Mutex<Vec<PutObject>>,
    api_keys: Mutex<Vec<String>>,
    list_calls: Mutex<Vec<(u32, u32)>>,
}

impl FakeRemote {
    pub fn uploads_to(url: &str) -> Self {
        Self {
            upload_url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn failing_upload(error: StorageError) -> Self {
        Self {
            upload_error: Mutex::new(Some(error)),
            ..Default::default()
        }
    }

    pub fn listing(body: Value) -> Self {
        Self {
            listing: body,
            ..Default::default()
        }
    }

    pub fn failing_listing(error: StorageError) -> Self {
        Self {
            listing_error: Mutex::new(Some(error)),
            ..Default::default()
        }
    }

    pub fn puts(&self) -> Vec<PutObject> {
        self.puts.lock().unwrap().clone()
    }

    pub fn api_keys(&self) -> Vec<String> {
        self.api_keys.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<(u32, u32)> {
        self.list_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStorage for FakeRemote {
    async fn put_object(&self, api_key: &str, object: PutObject) -> StorageResult<UploadEnvelope> {
        self.api_keys.lock().unwrap().push(api_key.to_string());
        self.puts.lock().unwrap().push(object);

        if let Some(error) = self.upload_error.lock().unwrap().take() {
            return Err(error);
        }

        Ok(UploadEnvelope {
            meta: json!({"request_id": "req_test"}),
            data: json!({"url": self.upload_url}),
            error: Value::Null,
        })
    }

    async fn list_media(&self, api_key: &str, page: u32, limit: u32) -> StorageResult<Value> {
        self.api_keys.lock().unwrap().push(api_key.to_string());
        self.list_calls.lock().unwrap().push((page, limit));

        if let Some(error) = self.listing_error.lock().unwrap().take() {
            return Err(error);
        }

        Ok(self.listing.clone())
    }
}

/// State wired to `remote`, spooling uploads into a fresh temp dir
pub fn state_with(api_key: Option<&str>, remote: Arc<FakeRemote>) -> (AppState, TempDir) {
    let spool = tempfile::tempdir().expect("Failed to create spool dir");
    let config = StorageConfig {
        api_key: api_key.map(str::to_string),
        upload_url: "https://remote.invalid".to_string(),
        listing_url: "https://remote.invalid/media".to_string(),
        bind_address: "127.0.0.1:0".to_string(),
        max_upload_bytes: 10 * 1024 * 1024,
        temp_dir: Some(spool.path().to_path_buf()),
    };

    (AppState::new(config, remote), spool)
}

/// Encode multipart parts as `(name, Some((file_name, content_type)), data)`
pub fn multipart_body(boundary: &str, parts: &[(&str, Option<(&str, &str)>, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, file, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                if !content_type.is_empty() {
                    body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
                }
            }
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
