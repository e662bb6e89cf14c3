use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sf_flags::FlagError;
use std::borrow::Cow;
use tracing::debug;

/// Errors returned by HTTP handlers, rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Unauthorized { message: Cow<'static, str> },

    #[error("{message}")]
    BadRequest { message: Cow<'static, str> },

    #[error(transparent)]
    Flag {
        #[from]
        source: FlagError,
    },
}

impl ApiError {
    pub(crate) fn unauthorized() -> Self {
        Self::Unauthorized { message: "Unauthorized".into() }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Flag { source: FlagError::NotFound { .. } } => StatusCode::NOT_FOUND,
            Self::Flag { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

/// Malformed bodies are client errors like any other invalid update.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest { message: rejection.body_text().into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!(status = status.as_u16(), error = %self, "Request rejected");
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
