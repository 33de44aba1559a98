//! Application-wide error types.
//!
//! Every layer keeps its own `thiserror` enum; they all funnel into
//! [`AppError`] before reaching the HTTP boundary. A variant carries the
//! machine-readable code the client sees (`"UNBALANCED_ENTRY"`,
//! `"FISCAL_PERIOD_NOT_FOUND"`, ...) next to the human message.

use serde_json::Value;
use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid credentials.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("{message}")]
    NotFound {
        /// Error code.
        code: &'static str,
        /// Human readable message.
        message: String,
    },

    /// Request failed validation. `values` echoes the submitted input.
    #[error("{message}")]
    Validation {
        /// Error code.
        code: &'static str,
        /// Human readable message.
        message: String,
        /// Submitted values, echoed back to the client.
        values: Option<Value>,
    },

    /// State conflict (duplicate code, overlap, still referenced, wrong status).
    #[error("{message}")]
    Conflict {
        /// Error code.
        code: &'static str,
        /// Human readable message.
        message: String,
    },

    /// Database error. The detail is logged, never returned to clients.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a not-found error.
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a validation error without echoed values.
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            values: None,
        }
    }

    /// Shorthand for a conflict error.
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    /// Attaches the submitted values to a validation error. Other variants are returned unchanged.
    #[must_use]
    pub fn with_values(self, submitted: Value) -> Self {
        match self {
            Self::Validation { code, message, .. } => Self::Validation {
                code,
                message,
                values: Some(submitted),
            },
            other => other,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::NotFound { .. } => 404,
            Self::Validation { .. } => 400,
            Self::Conflict { .. } => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound { code, .. }
            | Self::Validation { code, .. }
            | Self::Conflict { code, .. } => code,
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for server-side failures whose detail must stay in the logs.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }

    /// Message safe to return to a client.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        }
    }
}
