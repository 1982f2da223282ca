//! Common library for the media pipeline
//!
//! This crate provides the functionality shared by the proxy service and the
//! client components: the media data model, storage key derivation, the
//! process-wide remote storage configuration, and the remote storage client.

pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod storage_key;

pub use crate::config::StorageConfig;
pub use crate::error::{StorageError, StorageResult};
pub use crate::remote::{HttpRemoteStorage, PutObject, RemoteStorage};
