// lib.rs - Photo background replacement core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod app;
pub mod capabilities;
pub mod event;
pub mod image_processing;
pub mod model;
pub mod view;

use serde::{Deserialize, Serialize};

pub use app::App;
pub use capabilities::{BackendConfig, Capabilities, ConfigError, Effect, Endpoint};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::{Event, SelectedFile};
pub use image_processing::IntakeError;
pub use model::{
    BackgroundSource, Dimensions, GeneratedBackground, GenerationTicket, Model, OriginalPhoto,
    PhotoId, Session, Upload, UploadTicket,
};
pub use view::{Controls, UploadStatus, UserFacingError, ViewModel, ViewState};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000/";
const MIB: usize = 1024 * 1024;

pub const MAX_UPLOAD_BYTES: usize = 10 * MIB;
pub const UPLOAD_FIELD_NAME: &str = "photo";

pub const MSG_INVALID_IMAGE: &str = "Please select a valid image file";
pub const MSG_EMPTY_FILE: &str = "The selected file is empty";
pub const MSG_UPLOAD_FAILED: &str = "Failed to upload photo";
pub const MSG_UPLOAD_ERROR: &str = "Error uploading photo";
pub const MSG_NO_PHOTO_ID: &str = "No photo identifier received";
pub const MSG_UPLOAD_FIRST: &str = "Please upload an image first";
pub const MSG_GENERATION_FAILED: &str = "Failed to generate background";
pub const MSG_NO_BACKGROUND: &str = "No background image received";
pub const MSG_GENERATION_ERROR: &str = "Error generating background. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Upload,
    Generation,
    Network,
    Configuration,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Upload => "UPLOAD_ERROR",
            Self::Generation => "GENERATION_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::Configuration => "CONFIGURATION_ERROR",
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Generation)
    }
}

/// The single error a user can see at a time.
///
/// `message` is already user-facing; `internal_message` carries whatever the
/// transport or parser reported and is only meant for logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
    pub http_status: Option<u16>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
            http_status: None,
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    #[must_use]
    pub fn upload_first() -> Self {
        Self::new(ErrorKind::Validation, MSG_UPLOAD_FIRST)
    }

    /// Builds the error for a rejected generation request, preferring the
    /// backend's own `message` when the body carries one.
    #[must_use]
    pub fn from_generation_status(status: u16, body: Option<&[u8]>) -> Self {
        let message = body
            .and_then(|b| serde_json::from_slice::<ApiErrorResponse>(b).ok())
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| MSG_GENERATION_FAILED.to_string());

        Self::new(ErrorKind::Generation, message).with_http_status(status)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

impl From<IntakeError> for AppError {
    fn from(e: IntakeError) -> Self {
        let message = match &e {
            IntakeError::NotAnImage { .. } => MSG_INVALID_IMAGE.to_string(),
            IntakeError::Empty => MSG_EMPTY_FILE.to_string(),
            IntakeError::TooLarge { max, .. } => format!(
                "The image is too large. Please use an image smaller than {}.",
                format_size_limit(*max)
            ),
        };
        AppError::new(ErrorKind::Validation, message).with_internal(e.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Configuration, e.to_string())
    }
}

/// Renders an upload limit for people, rounded down to one decimal so the
/// stated limit is never above the real one.
fn format_size_limit(bytes: usize) -> String {
    const KIB: usize = 1024;

    let (unit, scale) = if bytes >= MIB {
        ("MB", MIB)
    } else if bytes >= KIB {
        ("KB", KIB)
    } else {
        return format!("{bytes} bytes");
    };

    let whole = bytes / scale;
    let tenth = (bytes % scale) * 10 / scale;
    if tenth == 0 {
        format!("{whole} {unit}")
    } else {
        format!("{whole}.{tenth} {unit}")
    }
}
