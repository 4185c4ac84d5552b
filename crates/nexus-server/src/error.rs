//! HTTP error mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use nexus_core::NexusError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid or missing bearer token")]
    Unauthorized,

    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),

    #[error(transparent)]
    Nexus(#[from] NexusError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Body(rejection) => rejection.status(),
            Self::Nexus(e) => match e {
                NexusError::NotFound(_) => StatusCode::NOT_FOUND,
                NexusError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                NexusError::DuplicateId(_) => StatusCode::CONFLICT,
                NexusError::UnresolvedTargets(_) => StatusCode::UNPROCESSABLE_ENTITY,
                NexusError::Config(_)
                | NexusError::Unavailable(_)
                | NexusError::Graph(_)
                | NexusError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Engine failures are logged in full but reported generically.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));
        let mut response = (status, body).into_response();
        if matches!(self, Self::Unauthorized) {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
