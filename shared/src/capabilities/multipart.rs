//! `multipart/form-data` encoding for the photo upload.
//!
//! The shell only moves bytes, so the core assembles the body itself. The
//! builder mirrors the shape of `reqwest::multipart` (`Form::part`,
//! `Part::bytes(..).file_name(..)`).

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    bytes: Vec<u8>,
    file_name: Option<String>,
    mime: Option<String>,
}

impl Part {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
            mime: None,
        }
    }

    #[must_use]
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    #[must_use]
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<(String, Part)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::with_boundary(format!(
            "----BackdropFormBoundary{}",
            uuid::Uuid::new_v4().simple()
        ))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    #[must_use]
    pub fn part(mut self, name: impl Into<String>, part: Part) -> Self {
        self.parts.push((name.into(), part));
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn finish(self) -> Vec<u8> {
        let payload: usize = self.parts.iter().map(|(_, p)| p.bytes.len() + 128).sum();
        let mut body = Vec::with_capacity(payload + self.boundary.len() + 8);

        for (name, part) in &self.parts {
            body.extend_from_slice(b"--");
            body.extend_from_slice(self.boundary.as_bytes());
            body.extend_from_slice(CRLF);

            body.extend_from_slice(b"Content-Disposition: form-data; name=\"");
            body.extend_from_slice(escape_quoted(name).as_bytes());
            body.push(b'"');
            if let Some(file_name) = &part.file_name {
                body.extend_from_slice(b"; filename=\"");
                body.extend_from_slice(escape_quoted(file_name).as_bytes());
                body.push(b'"');
            }
            body.extend_from_slice(CRLF);

            if let Some(mime) = &part.mime {
                body.extend_from_slice(b"Content-Type: ");
                body.extend_from_slice(strip_line_breaks(mime).as_bytes());
                body.extend_from_slice(CRLF);
            }

            body.extend_from_slice(CRLF);
            body.extend_from_slice(&part.bytes);
            body.extend_from_slice(CRLF);
        }

        body.extend_from_slice(b"--");
        body.extend_from_slice(self.boundary.as_bytes());
        body.extend_from_slice(b"--");
        body.extend_from_slice(CRLF);
        body
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

// Same escaping browsers apply to names in Content-Disposition.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn strip_line_breaks(value: &str) -> String {
    value.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}
