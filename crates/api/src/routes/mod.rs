//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod account_groups;
pub mod account_types;
pub mod accounts;
pub mod fiscal;
pub mod health;
pub mod journals;
pub mod reports;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(account_types::routes())
        .merge(account_groups::routes())
        .merge(accounts::routes())
        .merge(fiscal::routes())
        .merge(journals::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(health::routes()).merge(protected_routes)
}
