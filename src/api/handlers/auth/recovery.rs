use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::types::RecoveryRequest;
use crate::api::views::{require_payload, Notice, NoticeBody, Validate, ViewError, ViewScope};
use crate::api::SharedState;

#[utoipa::path(
    post,
    path = "/recovery",
    request_body = RecoveryRequest,
    responses(
        (status = 200, description = "Recovery mail requested", body = NoticeBody),
        (status = 422, description = "Missing email", body = NoticeBody),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "auth"
)]
pub async fn recovery(
    state: Extension<SharedState>,
    scope: ViewScope,
    payload: Option<Json<RecoveryRequest>>,
) -> Response {
    let request = match require_payload(payload) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = request.validate() {
        return err.into_response();
    }

    let url = state.config().recovery_url();
    match scope
        .run(
            state
                .appwrite()
                .account()
                .create_recovery(request.email.trim(), &url),
        )
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(NoticeBody {
                notice: Notice::success("Password reset email sent!"),
            }),
        )
            .into_response(),
        Err(err) => ViewError::backend("Password reset failed", &err).into_response(),
    }
}
