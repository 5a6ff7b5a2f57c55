use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stockview_core::errors::Error as CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// A service failure. `context` is the message clients see when the
    /// failure is internal.
    #[error("{context}: {source}")]
    Core {
        context: &'static str,
        #[source]
        source: CoreError,
    },
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn core(context: &'static str) -> impl FnOnce(CoreError) -> ApiError {
        move |source| ApiError::Core { context, source }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core { context, source } => match source {
                CoreError::Validation(_) => (StatusCode::BAD_REQUEST, source.to_string()),
                CoreError::NotFound(_) => (StatusCode::NOT_FOUND, source.to_string()),
                _ => {
                    tracing::error!(error = %source, transient = source.is_transient(), "{}", context);
                    (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
                }
            },
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
