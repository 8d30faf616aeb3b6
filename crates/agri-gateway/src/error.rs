//! `AgriError` → HTTP response.

use agri_core::AgriError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Which prediction endpoint failed; picks the opaque 500 message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Crop,
    Fertilizer,
    Disease,
    Yield,
}

impl Endpoint {
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Crop => "predict-crop",
            Endpoint::Fertilizer => "predict-fertilizer",
            Endpoint::Disease => "predict-disease",
            Endpoint::Yield => "predict-yield",
        }
    }

    fn internal_message(self) -> &'static str {
        match self {
            Endpoint::Crop => "Internal server error",
            Endpoint::Fertilizer => "Error processing fertilizer recommendation",
            Endpoint::Disease => "Error processing disease detection",
            Endpoint::Yield => "Error processing yield prediction",
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    endpoint: Option<Endpoint>,
    error: AgriError,
}

impl ApiError {
    pub fn new(endpoint: Endpoint, error: AgriError) -> Self {
        Self {
            endpoint: Some(endpoint),
            error,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            ref e if e.is_client_error() => StatusCode::BAD_REQUEST,
            AgriError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AgriError> for ApiError {
    fn from(error: AgriError) -> Self {
        Self {
            endpoint: None,
            error,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let endpoint = self.endpoint.map(Endpoint::name).unwrap_or("request");

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(endpoint, error = %self.error, "Request failed");
            self.endpoint
                .map(Endpoint::internal_message)
                .unwrap_or("Internal server error")
                .to_string()
        } else {
            if status == StatusCode::SERVICE_UNAVAILABLE {
                tracing::warn!(endpoint, error = %self.error, "Capability unavailable");
            } else {
                tracing::debug!(endpoint, error = %self.error, "Rejected request");
            }
            self.error.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (AgriError::MissingField("pH".into()), StatusCode::BAD_REQUEST),
            (AgriError::invalid("Year", "nope"), StatusCode::BAD_REQUEST),
            (AgriError::UnknownCrop("x".into()), StatusCode::BAD_REQUEST),
            (AgriError::EmptyUpload, StatusCode::BAD_REQUEST),
            (
                AgriError::ModelUnavailable("Yield prediction".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AgriError::UnknownClassIndex { index: 40, total: 38 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AgriError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError::new(Endpoint::Yield, error).status(), expected);
        }
    }

    async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value) {
        let res = error.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unavailable_model_keeps_its_message() {
        for (endpoint, label) in [
            (Endpoint::Crop, "Crop recommendation"),
            (Endpoint::Disease, "Disease detection"),
            (Endpoint::Yield, "Yield prediction"),
        ] {
            let error = ApiError::new(endpoint, AgriError::ModelUnavailable(label.into()));
            let (status, json) = body_of(error).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(json["error"], format!("{label} model not available"));
        }
    }

    #[tokio::test]
    async fn response_bodies_per_kind() {
        let (_, json) = body_of(ApiError::new(
            Endpoint::Fertilizer,
            AgriError::UnknownCrop("quinoa".into()),
        ))
        .await;
        assert_eq!(json["error"], "Crop 'quinoa' not found in database");

        let (_, json) = body_of(ApiError::new(
            Endpoint::Disease,
            AgriError::Internal("tract exploded at node 12".into()),
        ))
        .await;
        assert_eq!(json["error"], "Error processing disease detection");

        let (_, json) = body_of(ApiError::new(
            Endpoint::Crop,
            AgriError::UnknownClassIndex { index: 30, total: 22 },
        ))
        .await;
        assert_eq!(json["error"], "Internal server error");

        let (status, json) = body_of(ApiError::from(AgriError::Internal("x".into()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
    }

    #[test]
    fn client_errors_agree_with_core_classification() {
        for error in [
            AgriError::MissingField("a".into()),
            AgriError::EmptyUpload,
            AgriError::ModelUnavailable("Crop recommendation".into()),
        ] {
            let client = error.is_client_error();
            assert_eq!(ApiError::from(error).status().is_client_error(), client);
        }
    }
}
