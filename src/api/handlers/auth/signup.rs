//! Account signup.
//!
//! Flow: create the backend account under a fresh id, then the user document
//! under the same id carrying the chosen role. Success redirects to `/login`.

use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use super::gate::LOGIN_PATH;
use super::types::SignupRequest;
use crate::api::handlers::redirect_with_notice;
use crate::api::records::UserProfile;
use crate::api::views::{require_payload, Notice, NoticeBody, Validate, ViewError, ViewScope};
use crate::api::SharedState;
use crate::appwrite::{unique_id, Document};

#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 303, description = "Account created; redirect to login", body = NoticeBody),
        (status = 422, description = "Invalid signup data or duplicate email", body = NoticeBody),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "auth"
)]
pub async fn signup(
    state: Extension<SharedState>,
    scope: ViewScope,
    payload: Option<Json<SignupRequest>>,
) -> Response {
    let request = match require_payload(payload) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = request.validate() {
        return err.into_response();
    }

    let email = request.email.trim().to_string();
    let username = request.username.trim().to_string();

    let account = match scope
        .run(
            state
                .appwrite()
                .account()
                .create(&unique_id(), &email, &request.password, &username),
        )
        .await
    {
        Ok(account) => account,
        Err(err) if err.status() == Some(409) => {
            info!("Signup rejected: account already exists");
            return ViewError::Validation("An account with this email already exists.".to_string())
                .into_response();
        }
        Err(err) => return ViewError::backend("Signup failed", &err).into_response(),
    };

    let profile = UserProfile {
        username,
        email,
        account_id: account.id.clone(),
        role: Some(request.role),
    };

    let created: Result<Document<UserProfile>, _> = scope
        .run(
            state
                .databases()
                .create(&state.collections().users, &account.id, &profile),
        )
        .await;

    if let Err(err) = created {
        error!(user_id = %account.id, "Account created but user document failed: {err}");
        return ViewError::backend("Signup failed", &err).into_response();
    }

    info!(user_id = %account.id, "Signup succeeded");
    redirect_with_notice(
        LOGIN_PATH,
        Notice::success("Account created. Please log in."),
    )
}
