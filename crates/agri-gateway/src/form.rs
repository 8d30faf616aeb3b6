//! Form extraction for the prediction endpoints.
//!
//! Accepts `multipart/form-data` and `application/x-www-form-urlencoded`.
//! Any other content type, or no body at all, yields an empty field set so
//! the handler reports the first missing field.

use crate::error::ApiError;
use agri_core::{AgriError, AgriResult};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use std::collections::HashMap;
use std::str::FromStr;

/// An uploaded file part.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

/// Text fields and file parts of one request. The first occurrence of a
/// repeated name wins.
#[derive(Debug, Default)]
pub struct FormFields {
    text: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl FormFields {
    /// Check presence of every name, in order, before any parsing.
    pub fn require(&self, names: &[&str]) -> AgriResult<()> {
        match names.iter().find(|name| !self.text.contains_key(**name)) {
            Some(missing) => Err(AgriError::MissingField(missing.to_string())),
            None => Ok(()),
        }
    }

    pub fn text(&self, name: &str) -> AgriResult<&str> {
        self.text
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| AgriError::MissingField(name.to_string()))
    }

    pub fn parse<T>(&self, name: &str) -> AgriResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.text(name)?;
        raw.trim()
            .parse::<T>()
            .map_err(|e| AgriError::invalid(name, format!("'{raw}': {e}")))
    }

    /// A float field; `NaN` and infinities are rejected.
    pub fn number(&self, name: &str) -> AgriResult<f64> {
        let value: f64 = self.parse(name)?;
        if value.is_finite() {
            return Ok(value);
        }
        let raw = self.text(name)?;
        Err(AgriError::invalid(name, format!("'{raw}' is not a finite number")))
    }

    pub fn file(&self, name: &str) -> AgriResult<&Upload> {
        self.files
            .get(name)
            .ok_or_else(|| AgriError::MissingField(name.to_string()))
    }

    fn insert_text(&mut self, name: String, value: String) {
        self.text.entry(name).or_insert(value);
    }
}

fn rejection(reason: impl ToString) -> ApiError {
    AgriError::invalid("form", reason).into()
}

#[async_trait]
impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let mut fields = FormFields::default();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| rejection(e.body_text()))?;
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| rejection(e.body_text()))?
            {
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                match field.file_name().map(str::to_string) {
                    Some(filename) => {
                        let bytes = field.bytes().await.map_err(|e| rejection(e.body_text()))?;
                        fields
                            .files
                            .entry(name)
                            .or_insert(Upload { filename, bytes });
                    }
                    None => {
                        let value = field.text().await.map_err(|e| rejection(e.body_text()))?;
                        fields.insert_text(name, value);
                    }
                }
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| rejection(e.body_text()))?;
            for (name, value) in pairs {
                fields.insert_text(name, value);
            }
        }

        Ok(fields)
    }
}
