//! Wire and data models for the media pipeline

pub mod accept;
pub mod media;

pub use accept::{AcceptFilter, MediaCategory};
pub use media::{ErrorBody, ListingMeta, ListingPage, MediaItem, UploadEnvelope};
