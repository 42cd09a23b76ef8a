use std::io::Cursor;

use base64::Engine;
use image::ImageReader;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::event::SelectedFile;
use crate::model::{Dimensions, OriginalPhoto};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("declared content type '{mime_type}' is not an image")]
    NotAnImage { mime_type: String },

    #[error("input bytes empty")]
    Empty,

    #[error("input too large: {size} bytes, max {max}")]
    TooLarge { size: usize, max: usize },
}

/// Only the declared type counts; the bytes are never sniffed to overrule it.
pub fn is_image_mime(mime_type: &str) -> bool {
    let mime = mime_type.trim().to_ascii_lowercase();
    mime.strip_prefix("image/")
        .map_or(false, |subtype| !subtype.is_empty())
}

pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type.trim(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Reads just enough of the header to learn the pixel size. Anything the
/// decoder does not recognise yields `None`; the upload still goes ahead.
#[instrument(level = "debug", skip(bytes), fields(input_size = bytes.len()))]
pub fn probe_dimensions(bytes: &[u8]) -> Option<Dimensions> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;

    reader.format()?;

    match reader.into_dimensions() {
        Ok((width, height)) => Some(Dimensions { width, height }),
        Err(e) => {
            debug!(error = %e, "could not read image dimensions");
            None
        }
    }
}

/// Validates a selection and builds the local preview.
///
/// Checks run in order: declared type, emptiness, size.
#[instrument(
    skip(file),
    fields(name = %file.name, mime_type = %file.mime_type, input_size = file.bytes.len())
)]
pub fn accept(file: &SelectedFile, max_bytes: usize) -> Result<OriginalPhoto, IntakeError> {
    if !is_image_mime(&file.mime_type) {
        return Err(IntakeError::NotAnImage {
            mime_type: file.mime_type.clone(),
        });
    }

    if file.bytes.is_empty() {
        return Err(IntakeError::Empty);
    }

    if file.bytes.len() > max_bytes {
        return Err(IntakeError::TooLarge {
            size: file.bytes.len(),
            max: max_bytes,
        });
    }

    Ok(OriginalPhoto {
        name: file.name.clone(),
        mime_type: file.mime_type.trim().to_string(),
        size_bytes: file.bytes.len(),
        preview: to_data_uri(&file.mime_type, &file.bytes),
        dimensions: probe_dimensions(&file.bytes),
    })
}
