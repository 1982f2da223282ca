//! Upload widget state machine
//!
//! States: idle (with a transient dragging highlight), uploading, success and
//! error. A selection is validated locally before anything goes over the
//! network; only files that pass get a preview and an upload.
//!
//! Hosts driven by UI events use [`UploadWidget::begin`] and
//! [`UploadWidget::settle`] around their own call to
//! [`UploadTicket::send`]; [`UploadWidget::select`] does all three in one go.
//! While an upload is in flight further selections are ignored.

use std::{fmt, sync::Arc};

use common::models::{AcceptFilter, MediaCategory};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, ValidationError},
    file::{FileSource, UploadConstraints},
    preview::{PreviewHandle, PreviewRegistry},
    transport::{MediaApi, UploadRequest},
};

/// Message shown when an accepted file could not be uploaded
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload file. Please try again.";

/// Default maximum file size (10 MiB)
pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Shape of the drop zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "square")]
    Square,
    #[default]
    #[serde(rename = "16:9")]
    Widescreen,
}

/// Embedding options for [`UploadWidget`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProps {
    pub accept: AcceptFilter,
    pub max_size: u64,
    pub aspect_ratio: AspectRatio,
    /// Fixed height; overrides the aspect ratio when set
    pub height: Option<String>,
    pub folder: String,
}

impl Default for UploadProps {
    fn default() -> Self {
        Self {
            accept: AcceptFilter::default(),
            max_size: DEFAULT_MAX_SIZE,
            aspect_ratio: AspectRatio::default(),
            height: None,
            folder: common::storage_key::DEFAULT_FOLDER.to_string(),
        }
    }
}

/// Observable state of the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Dragging,
    Uploading,
    Success,
    Error,
}

enum State {
    Idle,
    Uploading { ticket: u64, preview: PreviewHandle },
    Success { preview: PreviewHandle, url: String },
    Error { message: String },
}

/// Outcome of offering a file to the widget
#[derive(Debug)]
pub enum Selection {
    /// An upload is already in flight
    Ignored,
    /// The file failed local validation; no request was made
    Rejected(ValidationError),
    /// The file was accepted; send the ticket and settle it
    Started(UploadTicket),
}

/// An accepted selection waiting to be sent
pub struct UploadTicket {
    id: u64,
    file: Arc<dyn FileSource>,
    folder: String,
}

impl fmt::Debug for UploadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadTicket")
            .field("id", &self.id)
            .field("file", &self.file.name())
            .field("folder", &self.folder)
            .finish()
    }
}

impl UploadTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Read the file and upload it, returning the remote URL
    pub async fn send(&self, api: &dyn MediaApi) -> Result<String, ClientError> {
        let bytes = self.file.read().await?;
        api.upload(UploadRequest {
            file_name: self.file.name().to_string(),
            mime_type: self.file.mime_type().to_string(),
            folder: self.folder.clone(),
            bytes,
        })
        .await
    }
}

/// Preview as rendered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView<'a> {
    pub url: &'a str,
    pub kind: Option<MediaCategory>,
}

/// Render snapshot of the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView<'a> {
    pub phase: UploadPhase,
    pub preview: Option<PreviewView<'a>>,
    pub error: Option<&'a str>,
    /// The file input is disabled while uploading
    pub disabled: bool,
    pub accepted_types: String,
    pub aspect_ratio: AspectRatio,
    pub height: Option<&'a str>,
}

type MediaSelectCallback = Box<dyn FnMut(&str) + Send>;

/// Single-file upload widget
pub struct UploadWidget {
    props: UploadProps,
    constraints: UploadConstraints,
    previews: PreviewRegistry,
    on_media_select: MediaSelectCallback,
    state: State,
    dragging: bool,
    next_ticket: u64,
}

impl UploadWidget {
    pub fn new(
        props: UploadProps,
        previews: PreviewRegistry,
        on_media_select: impl FnMut(&str) + Send + 'static,
    ) -> Self {
        let constraints = UploadConstraints {
            accept: props.accept.clone(),
            max_size: props.max_size,
        };

        Self {
            props,
            constraints,
            previews,
            on_media_select: Box::new(on_media_select),
            state: State::Idle,
            dragging: false,
            next_ticket: 1,
        }
    }

    pub fn phase(&self) -> UploadPhase {
        match &self.state {
            State::Idle if self.dragging => UploadPhase::Dragging,
            State::Idle => UploadPhase::Idle,
            State::Uploading { .. } => UploadPhase::Uploading,
            State::Success { .. } => UploadPhase::Success,
            State::Error { .. } => UploadPhase::Error,
        }
    }

    pub fn props(&self) -> &UploadProps {
        &self.props
    }

    /// Local preview reference, if one is held
    pub fn preview_url(&self) -> Option<&str> {
        self.preview().map(PreviewHandle::url)
    }

    /// Remote URL of the last successful upload
    pub fn remote_url(&self) -> Option<&str> {
        match &self.state {
            State::Success { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            State::Error { message } => Some(message),
            _ => None,
        }
    }

    fn preview(&self) -> Option<&PreviewHandle> {
        match &self.state {
            State::Uploading { preview, .. } | State::Success { preview, .. } => Some(preview),
            _ => None,
        }
    }

    pub fn drag_enter(&mut self) {
        if !matches!(self.state, State::Uploading { .. }) {
            self.dragging = true;
        }
    }

    pub fn drag_leave(&mut self) {
        self.dragging = false;
    }

    /// Offer a selected or dropped file to the widget
    pub fn begin(&mut self, file: Arc<dyn FileSource>) -> Selection {
        self.dragging = false;

        if matches!(self.state, State::Uploading { .. }) {
            debug!("Ignoring {} while an upload is in flight", file.name());
            return Selection::Ignored;
        }

        if let Err(e) = self.constraints.validate(file.as_ref()) {
            info!("Rejected {}: {}", file.name(), e);
            let previous = std::mem::replace(
                &mut self.state,
                State::Error {
                    message: e.to_string(),
                },
            );
            // the host still holds the URL reported for the replaced upload
            if matches!(previous, State::Success { .. }) {
                (self.on_media_select)("");
            }
            return Selection::Rejected(e);
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;

        // replacing the state releases any preview held from a previous upload
        self.state = State::Uploading {
            ticket,
            preview: self.previews.create(file.as_ref()),
        };

        Selection::Started(UploadTicket {
            id: ticket,
            file,
            folder: self.props.folder.clone(),
        })
    }

    /// Apply the outcome of a sent ticket
    pub fn settle(&mut self, ticket: u64, result: Result<String, ClientError>) -> UploadPhase {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Uploading {
                ticket: current,
                preview,
            } if current == ticket => match result {
                Ok(url) => {
                    (self.on_media_select)(&url);
                    self.state = State::Success { preview, url };
                }
                Err(e) => {
                    warn!("Upload failed: {}", e);
                    drop(preview);
                    self.state = State::Error {
                        message: UPLOAD_FAILED_MESSAGE.to_string(),
                    };
                }
            },
            other => {
                debug!("Discarding result of stale upload ticket {}", ticket);
                self.state = other;
            }
        }

        self.phase()
    }

    /// Validate, upload and settle one file
    pub async fn select(&mut self, file: Arc<dyn FileSource>, api: &dyn MediaApi) -> UploadPhase {
        match self.begin(file) {
            Selection::Started(ticket) => {
                let result = ticket.send(api).await;
                self.settle(ticket.id(), result)
            }
            Selection::Ignored | Selection::Rejected(_) => self.phase(),
        }
    }

    /// Clear the widget; after a success the host is told to drop its URL
    pub fn remove(&mut self) {
        match self.state {
            State::Uploading { .. } => debug!("Ignoring remove while uploading"),
            State::Success { .. } => {
                self.state = State::Idle;
                (self.on_media_select)("");
            }
            State::Error { .. } | State::Idle => self.state = State::Idle,
        }
    }

    pub fn view(&self) -> UploadView<'_> {
        UploadView {
            phase: self.phase(),
            preview: self.preview().map(|preview| PreviewView {
                url: preview.url(),
                kind: preview.kind(),
            }),
            error: self.error(),
            disabled: matches!(self.state, State::Uploading { .. }),
            accepted_types: self.props.accept.hint(),
            aspect_ratio: self.props.aspect_ratio,
            height: self.props.height.as_deref(),
        }
    }
}
