//! Error responses.
//!
//! Every handler returns `Result<_, ApiError>`. The body is always
//! `{"error": CODE, "message": text}`, plus `"values"` when a validation
//! failure echoes the submitted input. Server-side failures are logged and
//! answered with a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::error;

use bukubesar_core::fiscal::FiscalPeriodError;
use bukubesar_core::ledger::LedgerError;
use bukubesar_core::reports::ReportError as CoreReportError;
use bukubesar_db::repositories::{
    AccountError, AccountGroupError, AccountTypeError, BalanceError, FiscalError, JournalError,
    ReportError,
};
use bukubesar_shared::AppError;

/// HTTP-facing wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Echoes `submitted` on validation errors.
    #[must_use]
    pub fn with_values(self, submitted: Value) -> Self {
        Self(self.0.with_values(submitted))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if err.is_internal() {
            error!(error = %err, code = err.error_code(), "Request failed");
        }

        let mut body = json!({
            "error": err.error_code(),
            "message": err.public_message(),
        });
        if let AppError::Validation {
            values: Some(values),
            ..
        } = err
        {
            body["values"] = values;
        }

        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

macro_rules! into_api_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ApiError {
                fn from(err: $ty) -> Self {
                    Self(err.into())
                }
            }
        )*
    };
}

into_api_error!(
    LedgerError,
    FiscalPeriodError,
    CoreReportError,
    AccountTypeError,
    AccountGroupError,
    AccountError,
    FiscalError,
    JournalError,
    BalanceError,
    ReportError,
);

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::validation("INVALID_BODY", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(AppError::validation("INVALID_PATH", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::validation("INVALID_QUERY", rejection.body_text()))
    }
}
