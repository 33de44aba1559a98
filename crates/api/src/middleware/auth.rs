//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{AppState, ApiError};
use bukubesar_db::UserRepository;
use bukubesar_shared::{AppError, Claims, JwtError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError(AppError::Unauthorized(
            "Authorization header with Bearer token is required".to_string(),
        ))
        .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            let message = match e {
                JwtError::Expired => "Token has expired",
                JwtError::InvalidIssuer => "Token issuer is not trusted",
                _ => "Invalid or malformed token",
            };
            tracing::debug!(error = %e, "Rejected bearer token");
            ApiError(AppError::Unauthorized(message.to_string())).into_response()
        }
    }
}

/// Extractor for authenticated user claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0.user_id()
    }

    /// Returns the inner claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.0
    }

    /// Makes sure the `users` row for this subject exists and returns its ID.
    ///
    /// Called before writing audit columns (`created_by`, `posted_by`, ...).
    pub async fn ensure_recorded(&self, state: &AppState) -> Result<Uuid, ApiError> {
        UserRepository::new((*state.db).clone())
            .ensure(self.user_id(), self.0.email.clone(), self.0.name.clone())
            .await?;
        Ok(self.user_id())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError(AppError::Unauthorized("Authentication required".to_string())))
    }
}
