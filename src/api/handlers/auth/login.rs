//! Email/password login.
//!
//! Flow: create a session with the backend, read the account back with the
//! new session secret, resolve the role, then redirect to the role's landing
//! page with the session cookie and role cache set.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use tracing::{error, info};

use super::role::{landing_path, resolve_role, RoleCache};
use super::session::session_cookie;
use super::types::LoginRequest;
use crate::api::views::{require_payload, Notice, NoticeBody, Validate, ViewScope};
use crate::api::SharedState;
use crate::appwrite::AppwriteError;

fn login_failed(err: &AppwriteError) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(NoticeBody {
            notice: Notice::error(format!("Login failed: {}", err.user_message())),
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Logged in; redirect to the role landing page"),
        (status = 401, description = "Login failed", body = NoticeBody),
        (status = 422, description = "Missing email or password", body = NoticeBody)
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    state: Extension<SharedState>,
    scope: ViewScope,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let request = match require_payload(payload) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = request.validate() {
        return err.into_response();
    }

    let email = request.email.trim();
    let session = match scope
        .run(
            state
                .appwrite()
                .account()
                .create_email_session(email, &request.password),
        )
        .await
    {
        Ok(session) => session,
        Err(err) => {
            error!("Failed to create session: {err}");
            return login_failed(&err);
        }
    };

    let account = match scope
        .run(state.appwrite().account().get(&session.secret))
        .await
    {
        Ok(account) => account,
        Err(err) => {
            error!("Failed to read account after login: {err}");
            return login_failed(&err);
        }
    };

    let mut cache = RoleCache::from_headers(&headers);
    let role = resolve_role(&state, &scope, &account.id, &mut cache).await;
    let destination = landing_path(role.as_ref());

    info!(user_id = %account.id, destination, "Login succeeded");

    let mut response_headers = HeaderMap::new();
    match session_cookie(state.config(), &session.secret) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(NoticeBody {
                    notice: Notice::error("Login failed: session could not be stored."),
                }),
            )
                .into_response();
        }
    }
    cache.write_to(&mut response_headers);

    (response_headers, Redirect::to(destination)).into_response()
}
