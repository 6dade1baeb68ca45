//! Typed view of an inbound webhook submission.
//!
//! The provider posts `multipart/form-data` with these fields:
//!
//! | field         | kind | notes                                   |
//! |---------------|------|-----------------------------------------|
//! | `status`      | text | `"200"` on success                      |
//! | `id_gen`      | text | opaque, passed through to logs          |
//! | `time_gen`    | text | opaque, passed through to logs          |
//! | `img_message` | text | error text when `status != "200"`       |
//! | `res_image`   | file | the generated image                     |
//!
//! Text and file parts are merged into one map keyed by field name, text
//! first and files after, so a file part wins on a name collision.

pub mod store;

use std::collections::{HashMap, HashSet};

use axum::extract::Multipart;
use bytes::Bytes;
use tracing::debug;

use crate::error::SubmissionError;

pub use store::{ensure_upload_dir, process_submission, report_error};

/// An uploaded file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Client supplied filename, possibly empty
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Value of one merged form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(UploadedImage),
}

/// Form fields keyed by name.
#[derive(Debug, Default, Clone)]
pub struct FormFields {
    values: HashMap<String, FormValue>,
}

impl FormFields {
    /// Merge text and file parts. The first part of each kind wins for a
    /// repeated name; file parts then override text parts of the same name.
    pub fn merge(
        texts: impl IntoIterator<Item = (String, String)>,
        files: impl IntoIterator<Item = (String, UploadedImage)>,
    ) -> Self {
        let mut values = HashMap::new();

        for (name, text) in texts {
            values.entry(name).or_insert(FormValue::Text(text));
        }

        let mut seen_files = HashSet::new();
        for (name, file) in files {
            if seen_files.insert(name.clone()) {
                values.insert(name, FormValue::File(file));
            }
        }

        Self { values }
    }

    /// Drain a multipart body into a field map.
    ///
    /// A part counts as a file when its `Content-Disposition` carries a
    /// `filename` parameter, even an empty one.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, SubmissionError> {
        let mut texts = Vec::new();
        let mut files = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| SubmissionError::Malformed(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);

            let data = field
                .bytes()
                .await
                .map_err(|e| SubmissionError::Malformed(e.to_string()))?;

            debug!(
                field = %name,
                is_file = file_name.is_some(),
                size = data.len(),
                "multipart_field_read"
            );

            match file_name {
                Some(file_name) => files.push((
                    name,
                    UploadedImage {
                        file_name,
                        content_type,
                        bytes: data,
                    },
                )),
                None => texts.push((name, String::from_utf8_lossy(&data).into_owned())),
            }
        }

        Ok(Self::merge(texts, files))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn take_text(&mut self, name: &str) -> Option<String> {
        match self.values.remove(name) {
            Some(FormValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    fn take_file(&mut self, name: &str) -> Option<UploadedImage> {
        match self.values.remove(name) {
            Some(FormValue::File(file)) => Some(file),
            _ => None,
        }
    }
}

/// Inbound webhook submission.
///
/// A field of the wrong kind (a file under `status`, text under `res_image`)
/// is treated as absent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Submission {
    pub status: Option<String>,
    pub id_gen: Option<String>,
    pub time_gen: Option<String>,
    pub img_message: Option<String>,
    pub res_image: Option<UploadedImage>,
}

impl Submission {
    pub fn from_fields(mut fields: FormFields) -> Self {
        Submission {
            status: fields.take_text("status"),
            id_gen: fields.take_text("id_gen"),
            time_gen: fields.take_text("time_gen"),
            img_message: fields.take_text("img_message"),
            res_image: fields.take_file("res_image"),
        }
    }

    /// True when the provider reported a successful generation.
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("200")
    }
}
