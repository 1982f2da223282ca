//! Media models shared by the proxies and the client components

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::accept::MediaCategory;

/// A stored asset, as reported by the remote storage API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub filename: String,
    pub mimetype: String,
    #[serde(default)]
    pub size: u64,
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl MediaItem {
    /// Coarse category of this item, if it is an image or a video
    pub fn category(&self) -> Option<MediaCategory> {
        MediaCategory::from_mime(&self.mimetype)
    }
}

/// Pagination metadata of a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingMeta {
    /// Page number (1-based)
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Item count across all pages
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

impl ListingMeta {
    /// Build metadata for `total` items split into pages of `limit`
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit)) as u32
        };

        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    /// Highest page a caller may request; there is always at least one page
    pub fn last_page(&self) -> u32 {
        self.total_pages.max(1)
    }

    /// Clamp `page` to `[1, last_page]`
    pub fn clamp_page(&self, page: u32) -> u32 {
        page.clamp(1, self.last_page())
    }
}

/// A paginated listing response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    pub data: Vec<MediaItem>,
    pub meta: ListingMeta,
}

/// The remote storage envelope returned verbatim on a successful upload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadEnvelope {
    #[serde(default)]
    pub meta: serde_json::Value,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub error: serde_json::Value,
}

impl UploadEnvelope {
    /// Remote-assigned URL of the uploaded object, if present
    pub fn url(&self) -> Option<&str> {
        self.data
            .get("url")
            .and_then(|url| url.as_str())
            .filter(|url| !url.is_empty())
    }
}

/// Flat error shape used at every boundary crossing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
