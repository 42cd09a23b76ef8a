use serde::{Deserialize, Serialize};

use crate::model::{GeneratedBackground, Model, OriginalPhoto, Session, Upload};
use crate::AppError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploading,
    Uploaded,
    Failed,
}

impl From<&Upload> for UploadStatus {
    fn from(upload: &Upload) -> Self {
        match upload {
            Upload::Pending(_) => UploadStatus::Uploading,
            Upload::Complete(_) => UploadStatus::Uploaded,
            Upload::Failed => UploadStatus::Failed,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewState {
    Empty,
    Loaded {
        original: OriginalPhoto,
        upload: UploadStatus,
        result: Option<GeneratedBackground>,
    },
    Generating {
        original: OriginalPhoto,
        previous_result: Option<GeneratedBackground>,
    },
}

impl From<&Session> for ViewState {
    fn from(session: &Session) -> Self {
        match session {
            Session::Empty => ViewState::Empty,
            Session::Loaded {
                original,
                upload,
                result,
            } => ViewState::Loaded {
                original: original.clone(),
                upload: upload.into(),
                result: result.clone(),
            },
            Session::Generating {
                original,
                previous,
                ..
            } => ViewState::Generating {
                original: original.clone(),
                previous_result: previous.clone(),
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFacingError {
    pub message: String,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.message.clone(),
            is_retryable: e.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

/// Which controls the shell should enable.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Controls {
    pub can_add: bool,
    pub can_remove: bool,
    pub can_generate: bool,
    pub show_context_input: bool,
}

impl From<&Session> for Controls {
    fn from(session: &Session) -> Self {
        let has_original = session.original().is_some();
        Self {
            can_add: true,
            can_remove: has_original,
            // Without a handle the press still lands and explains itself.
            can_generate: has_original && !session.is_generating(),
            show_context_input: has_original,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub state: ViewState,
    pub error: Option<UserFacingError>,
    pub context: String,
    pub controls: Controls,
    pub file_input_key: u64,
}

impl ViewModel {
    pub fn is_generating(&self) -> bool {
        matches!(self.state, ViewState::Generating { .. })
    }

    pub fn original(&self) -> Option<&OriginalPhoto> {
        match &self.state {
            ViewState::Empty => None,
            ViewState::Loaded { original, .. } | ViewState::Generating { original, .. } => {
                Some(original)
            }
        }
    }

    pub fn result(&self) -> Option<&GeneratedBackground> {
        match &self.state {
            ViewState::Empty => None,
            ViewState::Loaded { result, .. } => result.as_ref(),
            ViewState::Generating {
                previous_result, ..
            } => previous_result.as_ref(),
        }
    }
}

impl From<&Model> for ViewModel {
    fn from(model: &Model) -> Self {
        Self {
            state: (&model.session).into(),
            error: model.error.as_ref().map(UserFacingError::from),
            context: model.context.clone(),
            controls: (&model.session).into(),
            file_input_key: model.file_input_key,
        }
    }
}
