mod http;
mod multipart;

pub use self::http::{
    generation_outcome, upload_outcome, AddPhotoResponse, BackendConfig, ConfigError, Endpoint,
    GenerateBackgroundRequest, GenerateBackgroundResponse, RemovePhotoRequest, MAX_URL_LENGTH,
};
pub use self::multipart::{MultipartForm, Part};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::event::Event;

/// Everything the core asks the shell to do: talk to the backend and redraw.
#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
}
