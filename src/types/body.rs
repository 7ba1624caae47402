//! Request payloads.
//!
//! JSON bodies are serialized once per attempt; form bodies are passed through to the
//! transport as multipart without a JSON content type.

use crate::{Error, ErrorContext, Result};
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(serde_json::Value),
    Form(FormData),
}

impl Body {
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(|e| {
                Error::configuration_with_context(
                    format!("body is not JSON-serializable: {}", e),
                    ErrorContext::new().with_field_path("request.body"),
                )
            })
    }

    pub fn is_form(&self) -> bool {
        matches!(self, Body::Form(_))
    }
}

impl From<serde_json::Value> for Body {
    fn from(v: serde_json::Value) -> Self {
        Body::Json(v)
    }
}

impl From<FormData> for Body {
    fn from(f: FormData) -> Self {
        Body::Form(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text(String),
    File {
        bytes: Bytes,
        file_name: Option<String>,
        mime: Option<String>,
    },
}

/// Multipart form payload.
///
/// Kept as plain data so a retried attempt can rebuild the multipart body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    parts: Vec<(String, FormPart)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormPart::Text(value.into())));
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        bytes: impl Into<Bytes>,
        file_name: impl Into<String>,
        mime: Option<&str>,
    ) -> Self {
        self.parts.push((
            name.into(),
            FormPart::File {
                bytes: bytes.into(),
                file_name: Some(file_name.into()),
                mime: mime.map(str::to_string),
            },
        ));
        self
    }

    pub fn parts(&self) -> &[(String, FormPart)] {
        &self.parts
    }

    /// Sum of part payload sizes, excluding multipart framing.
    pub fn payload_len(&self) -> u64 {
        self.parts
            .iter()
            .map(|(_, p)| match p {
                FormPart::Text(t) => t.len() as u64,
                FormPart::File { bytes, .. } => bytes.len() as u64,
            })
            .sum()
    }

    pub(crate) fn to_multipart(&self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, part) in &self.parts {
            form = match part {
                FormPart::Text(t) => form.text(name.clone(), t.clone()),
                FormPart::File {
                    bytes,
                    file_name,
                    mime,
                } => {
                    let mut p = reqwest::multipart::Part::bytes(bytes.to_vec());
                    if let Some(f) = file_name {
                        p = p.file_name(f.clone());
                    }
                    if let Some(m) = mime {
                        p = p.mime_str(m).map_err(|e| {
                            Error::configuration_with_context(
                                format!("Invalid mime: {}", e),
                                ErrorContext::new()
                                    .with_field_path(format!("form[{}]", name))
                                    .with_details(m.clone()),
                            )
                        })?;
                    }
                    form.part(name.clone(), p)
                }
            };
        }
        Ok(form)
    }
}
