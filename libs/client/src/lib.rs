//! Client components for the media pipeline
//!
//! [`UploadWidget`] validates a selected file, previews it and uploads it
//! through the upload proxy. [`GalleryViewer`] pages through the listing
//! proxy and reports the item a user picks. Both talk to the proxies through
//! a [`MediaApi`], with [`HttpMediaApi`] as the reqwest-backed implementation.

pub mod error;
pub mod file;
pub mod gallery;
pub mod preview;
pub mod transport;
pub mod upload;

pub use error::{ClientError, ValidationError};
pub use file::{FileSource, LocalFile, MemoryFile, UploadConstraints};
pub use gallery::{GalleryProps, GalleryView, GalleryViewer, PageRequest};
pub use preview::{PreviewHandle, PreviewRegistry};
pub use transport::{HttpMediaApi, MediaApi, UploadRequest};
pub use upload::{AspectRatio, Selection, UploadPhase, UploadProps, UploadTicket, UploadWidget};
