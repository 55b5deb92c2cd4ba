//! Error types shared across the crate, plus the JSON plumbing that keeps
//! every failure response well-formed.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::storage::UploadError;

/// Failures surfaced by the user store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Insert rejected by the unique index on email.
    #[error("Email already in use")]
    DuplicateEmail,
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db)
                if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                StoreError::DuplicateEmail
            }
            _ => StoreError::Database(e),
        }
    }
}

/// Request-level error taxonomy. Every variant renders as a JSON body; the
/// client is never handed an unstructured failure.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => ApiError::Conflict("Email already in use".into()),
            StoreError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Io(e) => ApiError::Internal(e.into()),
            rejected => ApiError::Validation(rejected.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(message) => {
                warn!(%message, "request rejected");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        message,
                        error: None,
                    },
                )
            }
            ApiError::Conflict(message) => {
                warn!(%message, "conflicting write rejected");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        message,
                        error: None,
                    },
                )
            }
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    message,
                    error: None,
                },
            ),
            ApiError::Internal(err) => {
                error!(error = ?err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: "Something went wrong".into(),
                        error: Some(err.to_string()),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// `Json<T>` wrapper whose rejection is an [`ApiError`], so malformed bodies
/// come back as the same JSON shape as every other validation failure.
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(map_rejection(rejection)),
        }
    }
}

fn map_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}
