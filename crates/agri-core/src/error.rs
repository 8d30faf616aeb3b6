//! Error types for the agricultural ML API

use thiserror::Error;

/// Result type alias for request-level operations
pub type AgriResult<T> = Result<T, AgriError>;

/// Result type alias for artifact loading and inference
pub type ModelResult<T> = Result<T, ModelError>;

/// Failures surfaced to API callers. The gateway maps each kind to a status code.
#[derive(Error, Debug)]
pub enum AgriError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid input data: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("{0} model not available")]
    ModelUnavailable(String),

    #[error("Crop '{0}' not found in database")]
    UnknownCrop(String),

    #[error("Class index {index} is outside the {total} known classes")]
    UnknownClassIndex { index: usize, total: usize },

    #[error("No selected file")]
    EmptyUpload,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgriError {
    pub fn invalid(field: impl Into<String>, reason: impl ToString) -> Self {
        AgriError::InvalidInput {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// True for kinds caused by the request itself (reported as 4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AgriError::MissingField(_)
                | AgriError::InvalidInput { .. }
                | AgriError::UnknownCrop(_)
                | AgriError::EmptyUpload
        )
    }
}

impl From<ModelError> for AgriError {
    fn from(err: ModelError) -> Self {
        AgriError::Internal(err.to_string())
    }
}

impl From<DataError> for AgriError {
    fn from(err: DataError) -> Self {
        AgriError::Internal(err.to_string())
    }
}

/// Errors raised while deserializing or invoking a model artifact.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Artifact load failed ({path}): {reason}")]
    Load { path: String, reason: String },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Input has {actual} features, artifact expects {expected}")]
    Shape { expected: usize, actual: usize },

    #[error("Column {column} expects a {expected} value")]
    ColumnType { column: usize, expected: &'static str },

    #[error("Column {column} has unknown category '{value}'")]
    UnknownCategory { column: usize, value: String },

    #[error("Artifact produced an empty output")]
    EmptyOutput,

    #[error("Image decode failed: {0}")]
    Image(String),
}

/// Errors raised while reading reference data (nutrient table, knowledge base, alias table).
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Label alias cycle through '{0}'")]
    AliasCycle(String),
}

impl From<image::ImageError> for ModelError {
    fn from(err: image::ImageError) -> Self {
        ModelError::Image(err.to_string())
    }
}
