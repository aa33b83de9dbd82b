//! Transport-neutral multipart form.
//!
//! Forms are plain data so they can be built, inspected and tested without an
//! HTTP stack. [`super::ReqwestTransport`] converts them at send time.

/// Value of one form part.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    Bytes {
        data: Vec<u8>,
        file_name: Option<String>,
    },
}

/// A named form part.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    name: &'static str,
    value: FormValue,
}

impl FormPart {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value(&self) -> &FormValue {
        &self.value
    }

    /// Splits the part into its name and value.
    pub fn into_inner(self) -> (&'static str, FormValue) {
        (self.name, self.value)
    }
}

/// An ordered multipart form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text part.
    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name,
            value: FormValue::Text(value.into()),
        });
        self
    }

    /// Appends a binary part.
    pub fn bytes(mut self, name: &'static str, data: Vec<u8>, file_name: Option<String>) -> Self {
        self.parts.push(FormPart {
            name,
            value: FormValue::Bytes { data, file_name },
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// First text part named `name`.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match &part.value {
            FormValue::Text(text) if part.name == name => Some(text.as_str()),
            _ => None,
        })
    }

    /// First binary part named `name`.
    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.parts.iter().find_map(|part| match &part.value {
            FormValue::Bytes { data, .. } if part.name == name => Some(data.as_slice()),
            _ => None,
        })
    }

    /// Total payload size in bytes, ignoring multipart framing.
    pub fn payload_size(&self) -> usize {
        self.parts
            .iter()
            .map(|part| match &part.value {
                FormValue::Text(text) => text.len(),
                FormValue::Bytes { data, .. } => data.len(),
            })
            .sum()
    }
}
