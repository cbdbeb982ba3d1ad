use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use tracing::error;

use super::gate::LOGIN_PATH;
use super::role::RoleCache;
use super::session::{clear_session_cookie, extract_session_token};
use crate::api::views::ViewScope;
use crate::api::SharedState;

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 303, description = "Session cleared; redirect to login")
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    state: Extension<SharedState>,
    scope: ViewScope,
) -> Response {
    if let Some(token) = extract_session_token(&headers) {
        if let Err(err) = scope
            .run(state.appwrite().account().delete_session(&token))
            .await
        {
            error!("Failed to delete session: {err}");
        }
    }

    // Cookies are cleared even when the backend session was already gone.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(state.config()) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    let mut cache = RoleCache::from_headers(&headers);
    cache.clear();
    cache.write_to(&mut response_headers);

    (response_headers, Redirect::to(LOGIN_PATH)).into_response()
}
