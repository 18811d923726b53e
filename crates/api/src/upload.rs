//! Multipart form collection.
//!
//! Handlers that accept uploads read the whole form up front with
//! [`read_form`] and then pull typed values out of the resulting [`Form`].

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use rentora_core::error::CoreError;

use crate::error::{AppError, AppResult};

/// A file part of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

/// Text fields and file parts of a multipart form, keyed by field name.
#[derive(Debug, Default)]
pub struct Form {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<UploadedFile>>,
}

/// Field name under which a part is filed. `images[]` and `images` are the
/// same field.
fn field_key(name: &str) -> &str {
    name.strip_suffix("[]").unwrap_or(name)
}

/// Drain a multipart body into a [`Form`].
///
/// Parts carrying a file name are files; everything else is text. Empty file
/// parts (a form submitted without choosing a file) are skipped.
pub async fn read_form(mut multipart: Multipart) -> AppResult<Form> {
    let mut form = Form::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(|n| field_key(n).to_string()) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.push_file(name, file_name, data);
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.fields.insert(name, text);
            }
        }
    }

    Ok(form)
}

impl Form {
    fn push_file(&mut self, name: String, file_name: String, data: Bytes) {
        if file_name.is_empty() && data.is_empty() {
            return;
        }
        self.files
            .entry(name)
            .or_default()
            .push(UploadedFile { file_name, data });
    }

    /// Text value of a field. Blank values count as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Owned text value of a field, trimmed.
    pub fn take_text(&mut self, name: &str) -> Option<String> {
        self.fields
            .remove(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Parse a field with [`std::str::FromStr`], reporting the field name on failure.
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> AppResult<Option<T>> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
                AppError::Core(CoreError::Validation(format!(
                    "{name} has an invalid value: {raw}"
                )))
            }),
        }
    }

    /// All files sent under `name`, in upload order.
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        self.files.remove(name).unwrap_or_default()
    }

    /// The first file sent under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.take_files(name).into_iter().next()
    }

    /// Whether any file part was sent under `name`.
    pub fn has_files(&self, name: &str) -> bool {
        self.files.get(name).is_some_and(|f| !f.is_empty())
    }
}
