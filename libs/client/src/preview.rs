//! Local, revocable preview references
//!
//! A [`PreviewHandle`] plays the role of a blob URL: it is registered on
//! creation and revoked when the handle is dropped, so a widget releases its
//! preview on every exit from the states that hold one.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use common::models::MediaCategory;
use tracing::debug;
use uuid::Uuid;

use crate::file::FileSource;

#[derive(Debug, Clone)]
struct PreviewEntry {
    name: String,
}

/// Registry of live preview references
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<Mutex<HashMap<String, PreviewEntry>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, PreviewEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a preview for `file`
    pub fn create(&self, file: &dyn FileSource) -> PreviewHandle {
        let url = format!("blob:preview/{}", Uuid::new_v4());
        self.entries().insert(
            url.clone(),
            PreviewEntry {
                name: file.name().to_string(),
            },
        );
        debug!("Created preview {} for {}", url, file.name());

        PreviewHandle {
            url,
            kind: MediaCategory::from_mime(file.mime_type()),
            registry: self.clone(),
        }
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.entries().contains_key(url)
    }

    /// Number of previews not yet released
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    fn revoke(&self, url: &str) {
        if let Some(entry) = self.entries().remove(url) {
            debug!("Revoked preview {} for {}", url, entry.name);
        }
    }
}

/// An owned preview reference; dropping it revokes the reference
#[derive(Debug)]
pub struct PreviewHandle {
    url: String,
    kind: Option<MediaCategory>,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the preview renders as an image or a video
    pub fn kind(&self) -> Option<MediaCategory> {
        self.kind
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}
