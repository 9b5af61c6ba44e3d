use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use hyper::StatusCode;
use serde_json::json;
use thiserror::Error;

/// API-level error taxonomy. Every handler returns `Result<_, ApiError>`;
/// the `IntoResponse` impl maps each variant onto the HTTP surface with a
/// machine-readable JSON body. Nothing is silently swallowed and there is
/// no retry logic: each request succeeds or fails deterministically.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or invalid field value. Rendered as 400 with either a
    /// field-level error `{"<field>": "<message>"}` or `{"detail": ...}`.
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },
    /// Unknown entity. Rendered as 404 `{"detail": "<what> not found."}`.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Missing or invalid credentials. Rendered as 401.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Role or ownership mismatch. Rendered as 403.
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("report rendering failed: {0}")]
    Report(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: None,
            message: message.into(),
        }
    }

    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn not_found(what: &'static str) -> Self {
        ApiError::NotFound(what)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation { field, message } => {
                let body = match field {
                    Some(field) => json!({ field: message }),
                    None => json!({ "detail": message }),
                };
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "detail": format!("{what} not found.") }),
            ),
            ApiError::Unauthorized(detail) => {
                (StatusCode::UNAUTHORIZED, json!({ "detail": detail }))
            }
            ApiError::Forbidden(detail) => (StatusCode::FORBIDDEN, json!({ "detail": detail })),
            ApiError::Database(e) => {
                tracing::error!(
                    name = "api.database_error",
                    target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                    error = %e,
                    message = "Database operation failed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": format!("DB error: {e}") }),
                )
            }
            ApiError::Report(e) => {
                tracing::error!(
                    name = "api.report_render_error",
                    target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                    error = %e,
                    message = "PDF report rendering failed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": format!("Report error: {e}") }),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!(
                    name = "api.internal_error",
                    target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                    error = %e,
                    message = "Internal error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": e }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// JSON body extractor that reports malformed bodies as the same 400
/// validation shape as field errors, instead of axum's default 422.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::validation(rejection.body_text())),
        }
    }
}
