//! Route gate for protected views.
//!
//! The gate asks the backend for a live session before the wrapped view
//! runs. Without one the request is redirected to `/login` and the view never
//! runs, so no document store call is made for anonymous requests.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use super::principal::lookup_session;
use crate::api::SharedState;

pub const LOGIN_PATH: &str = "/login";

/// Middleware: insert the [`super::Principal`] and run the view, or redirect.
pub async fn require_session(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(principal) = lookup_session(request.headers(), &state).await else {
        debug!(path = %request.uri().path(), "No session, redirecting to login");
        return Redirect::to(LOGIN_PATH).into_response();
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}
