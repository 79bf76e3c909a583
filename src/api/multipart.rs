/// Minimal `multipart/form-data` body builder for text fields.
///
/// The capture endpoint reads the frame from a plain form field (`image`)
/// holding a data URL, so only text parts are needed.
use anyhow::{Result, ensure};
use chrono::Utc;

/// An encoded multipart body plus its boundary.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    fields: Vec<(String, String)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Self::with_boundary(format!("----emotion-console-{nanos:x}"))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            fields: Vec::new(),
        }
    }

    /// Append a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Value for the `Content-Type` request header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encode the body. Fails if a field value contains the boundary.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut body = String::new();
        for (name, value) in &self.fields {
            ensure!(
                !value.contains(&self.boundary),
                "field '{name}' contains the multipart boundary"
            );
            body.push_str("--");
            body.push_str(&self.boundary);
            body.push_str("\r\n");
            body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            ));
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str("--");
        body.push_str(&self.boundary);
        body.push_str("--\r\n");
        Ok(body.into_bytes())
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}
