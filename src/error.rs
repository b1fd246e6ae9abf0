use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Coarse message every failed operation renders at the boundary.
pub const MESSAGE_ERROR: &str = "Error";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("patient_id is required")]
    MissingPatientId,
    #[error("reason is required")]
    MissingReason,
    #[error("appointment_id is required")]
    MissingAppointmentId,
    #[error("{0} is not a valid identifier")]
    MalformedIdentifier(&'static str),
    #[error("one of reason or status must be provided")]
    MissingMutation,
    #[error("reason and status cannot be changed in the same request")]
    ConflictingMutation,
    #[error("limit must be at least 1")]
    InvalidLimit,
    #[error("offset must not be negative")]
    InvalidOffset,
}

/// Failures reported by an `AppointmentStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("referenced patient does not exist")]
    ForeignKeyViolation,
    #[error("db error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("appointment {0} not found")]
    NotFound(Uuid),
    #[error("patient {0} does not exist")]
    ReferentialIntegrity(Uuid),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl AppointmentError {
    /// The flattened message callers of the original API relied on.
    pub fn message(&self) -> &'static str {
        MESSAGE_ERROR
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppointmentError::Validation(_) => "VALIDATION_ERROR",
            AppointmentError::NotFound(_) => "NOT_FOUND",
            AppointmentError::ReferentialIntegrity(_) => "PATIENT_NOT_FOUND",
            AppointmentError::Storage(_) => "INTERNAL",
        }
    }
}

impl From<StoreError> for AppointmentError {
    fn from(e: StoreError) -> Self {
        AppointmentError::Storage(e.to_string())
    }
}

/* -------------------------
   HTTP rendering
--------------------------*/

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: ErrorObject,
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str, String),
    NotFound(&'static str, String),
    Unprocessable(&'static str, String),
    Internal(String),
}

impl ApiError {
    fn to_error_response(code: &str, message: &str) -> Json<ErrorResponse> {
        Json(ErrorResponse {
            message: MESSAGE_ERROR.to_string(),
            error: ErrorObject {
                code: code.to_string(),
                message: message.to_string(),
            },
        })
    }
}

impl From<AppointmentError> for ApiError {
    fn from(e: AppointmentError) -> Self {
        let code = e.code();
        let detail = e.to_string();
        match e {
            AppointmentError::Validation(_) => ApiError::BadRequest(code, detail),
            AppointmentError::NotFound(_) => ApiError::NotFound(code, detail),
            AppointmentError::ReferentialIntegrity(_) => ApiError::Unprocessable(code, detail),
            AppointmentError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        AppointmentError::Validation(e).into()
    }
}

// Extractor rejections get the same envelope as service errors.

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest("VALIDATION_ERROR", e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::BadRequest("VALIDATION_ERROR", e.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        ApiError::BadRequest("VALIDATION_ERROR", e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(code, msg) => {
                (StatusCode::BAD_REQUEST, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::NotFound(code, msg) => {
                (StatusCode::NOT_FOUND, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Unprocessable(code, msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::to_error_response(code, &msg),
            )
                .into_response(),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::to_error_response("INTERNAL", "internal server error"),
                )
                    .into_response()
            }
        }
    }
}
