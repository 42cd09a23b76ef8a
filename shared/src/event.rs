use serde::{Deserialize, Serialize};
use std::fmt;

use crux_http::Response;

use crate::capabilities::{AddPhotoResponse, GenerateBackgroundResponse};
use crate::model::{GenerationTicket, PhotoId, UploadTicket};

/// A file the shell picked up from its file input.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum Event {
    // Shell setup
    Configure {
        base_url: String,
        max_upload_bytes: Option<usize>,
    },

    // User intents
    PhotoSelected(SelectedFile),
    ContextChanged(String),
    GenerateRequested,
    RemoveRequested,
    DismissError,

    // Capability responses (boxed to keep enum size small)
    #[serde(skip)]
    PhotoUploaded {
        ticket: UploadTicket,
        result: Box<crux_http::Result<Response<AddPhotoResponse>>>,
    },
    #[serde(skip)]
    BackgroundGenerated {
        ticket: GenerationTicket,
        result: Box<crux_http::Result<Response<GenerateBackgroundResponse>>>,
    },
    #[serde(skip)]
    PhotoReleased {
        photo_id: PhotoId,
        result: Box<crux_http::Result<Response<Vec<u8>>>>,
    },
}

impl Event {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configure { .. } => "configure",
            Self::PhotoSelected(_) => "photo_selected",
            Self::ContextChanged(_) => "context_changed",
            Self::GenerateRequested => "generate_requested",
            Self::RemoveRequested => "remove_requested",
            Self::DismissError => "dismiss_error",
            Self::PhotoUploaded { .. } => "photo_uploaded",
            Self::BackgroundGenerated { .. } => "background_generated",
            Self::PhotoReleased { .. } => "photo_released",
        }
    }

    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::PhotoSelected(_)
                | Self::ContextChanged(_)
                | Self::GenerateRequested
                | Self::RemoveRequested
                | Self::DismissError
        )
    }
}
