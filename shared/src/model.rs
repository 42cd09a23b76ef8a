use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::BackendConfig;
use crate::AppError;

/// Server-issued handle for an uploaded photo.
///
/// Backends answer with either a string or an integer primary key. The
/// original JSON shape is kept so the id goes back out exactly as it came in.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum PhotoId {
    Number(u64),
    Text(String),
}

impl PhotoId {
    pub fn is_blank(&self) -> bool {
        match self {
            PhotoId::Number(_) => false,
            PhotoId::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoId::Number(n) => write!(f, "{n}"),
            PhotoId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PhotoId {
    fn from(s: &str) -> Self {
        PhotoId::Text(s.to_string())
    }
}

impl From<String> for PhotoId {
    fn from(s: String) -> Self {
        PhotoId::Text(s)
    }
}

impl From<u64> for PhotoId {
    fn from(n: u64) -> Self {
        PhotoId::Number(n)
    }
}

// --- Sequencing tickets ---

macro_rules! ticket {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

ticket!(UploadTicket);
ticket!(GenerationTicket);

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// The user's photo as shown locally, before and independent of the upload.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OriginalPhoto {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: usize,
    /// `data:` URI the shell can put straight into an `<img src>`.
    pub preview: String,
    pub dimensions: Option<Dimensions>,
}

// The preview is the whole file in base64; keep it out of logs.
impl fmt::Debug for OriginalPhoto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginalPhoto")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.size_bytes)
            .field("preview_len", &self.preview.len())
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSource {
    Url,
    DataUri,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GeneratedBackground {
    pub src: String,
    pub source: BackgroundSource,
}

impl GeneratedBackground {
    /// `None` when the backend sent an empty value.
    pub fn from_backend(src: &str) -> Option<Self> {
        let src = src.trim();
        if src.is_empty() {
            return None;
        }

        let source = if src
            .get(..5)
            .map_or(false, |scheme| scheme.eq_ignore_ascii_case("data:"))
        {
            BackgroundSource::DataUri
        } else {
            BackgroundSource::Url
        };

        Some(Self {
            src: src.to_string(),
            source,
        })
    }
}

impl fmt::Debug for GeneratedBackground {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("GeneratedBackground");
        match self.source {
            BackgroundSource::Url => s.field("src", &self.src),
            BackgroundSource::DataUri => s.field("src_len", &self.src.len()),
        };
        s.field("source", &self.source).finish()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Upload {
    Pending(UploadTicket),
    Complete(PhotoId),
    Failed,
}

/// What the user is looking at. Only combinations that can actually be shown
/// are representable: there is no "generating" without an original and a handle.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Empty,
    Loaded {
        original: OriginalPhoto,
        upload: Upload,
        result: Option<GeneratedBackground>,
    },
    Generating {
        original: OriginalPhoto,
        photo_id: PhotoId,
        ticket: GenerationTicket,
        previous: Option<GeneratedBackground>,
    },
}

impl Session {
    pub fn loaded(original: OriginalPhoto, ticket: UploadTicket) -> Self {
        Session::Loaded {
            original,
            upload: Upload::Pending(ticket),
            result: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Session::Empty)
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, Session::Generating { .. })
    }

    pub fn original(&self) -> Option<&OriginalPhoto> {
        match self {
            Session::Empty => None,
            Session::Loaded { original, .. } | Session::Generating { original, .. } => {
                Some(original)
            }
        }
    }

    pub fn photo_id(&self) -> Option<&PhotoId> {
        match self {
            Session::Loaded {
                upload: Upload::Complete(id),
                ..
            }
            | Session::Generating { photo_id: id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&GeneratedBackground> {
        match self {
            Session::Loaded { result, .. } => result.as_ref(),
            Session::Generating { previous, .. } => previous.as_ref(),
            Session::Empty => None,
        }
    }

    pub fn pending_upload(&self) -> Option<UploadTicket> {
        match self {
            Session::Loaded {
                upload: Upload::Pending(ticket),
                ..
            } => Some(*ticket),
            _ => None,
        }
    }

    pub fn generation_ticket(&self) -> Option<GenerationTicket> {
        match self {
            Session::Generating { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }

    /// Settles the upload identified by `ticket`. Returns `false`, leaving the
    /// session untouched, when the session is no longer waiting on it.
    pub fn settle_upload(&mut self, ticket: UploadTicket, outcome: Upload) -> bool {
        match self {
            Session::Loaded { upload, .. } if *upload == Upload::Pending(ticket) => {
                *upload = outcome;
                true
            }
            _ => false,
        }
    }

    /// Moves a loaded session with a handle into `Generating` and returns the
    /// handle to send. Any other session is left as it was.
    pub fn begin_generation(&mut self, ticket: GenerationTicket) -> Option<PhotoId> {
        match std::mem::take(self) {
            Session::Loaded {
                original,
                upload: Upload::Complete(photo_id),
                result,
            } => {
                *self = Session::Generating {
                    original,
                    photo_id: photo_id.clone(),
                    ticket,
                    previous: result,
                };
                Some(photo_id)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// Leaves `Generating` for `ticket`. A new background replaces the
    /// previous one; `None` keeps whatever was shown before.
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        background: Option<GeneratedBackground>,
    ) -> bool {
        if self.generation_ticket() != Some(ticket) {
            return false;
        }

        match std::mem::take(self) {
            Session::Generating {
                original,
                photo_id,
                previous,
                ..
            } => {
                *self = Session::Loaded {
                    original,
                    upload: Upload::Complete(photo_id),
                    result: background.or(previous),
                };
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: BackendConfig,
    pub session: Session,
    pub context: String,
    pub error: Option<AppError>,
    /// Bumped on every removal so the shell re-creates its file input.
    pub file_input_key: u64,
    last_upload_ticket: u64,
    last_generation_ticket: u64,
}

impl Model {
    pub fn issue_upload_ticket(&mut self) -> UploadTicket {
        self.last_upload_ticket += 1;
        UploadTicket(self.last_upload_ticket)
    }

    pub fn issue_generation_ticket(&mut self) -> GenerationTicket {
        self.last_generation_ticket += 1;
        GenerationTicket(self.last_generation_ticket)
    }

    pub fn set_error(&mut self, error: AppError) {
        self.error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Back to `Empty`. Configuration and ticket counters survive.
    pub fn reset(&mut self) {
        self.session = Session::Empty;
        self.context.clear();
        self.error = None;
        self.file_input_key = self.file_input_key.wrapping_add(1);
    }
}
