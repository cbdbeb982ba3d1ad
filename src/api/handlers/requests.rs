//! Volunteer requests: submitted by volunteers, settled by orphanages.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use super::auth::{resolve_role, Principal, Role, RoleCache};
use crate::api::records::{VolunteerRequest, REQUEST_STATUS_PENDING};
use crate::api::views::{
    require, require_payload, ListView, Notice, NoticeBody, Validate, ViewError, ViewScope,
};
use crate::api::SharedState;
use crate::appwrite::{unique_id, Document, Query};

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequestForm {
    #[serde(default)]
    pub volunteer_name: String,
    #[serde(default)]
    pub message: String,
}

impl Validate for RequestForm {
    fn validate(&self) -> Result<(), ViewError> {
        require("Volunteer name", &self.volunteer_name)?;
        require("Message", &self.message)
    }
}

#[derive(Debug, Serialize)]
pub struct SubmittedRequest {
    pub document: Document<VolunteerRequest>,
    pub notice: Notice,
}

#[derive(ToSchema, Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestDecision {
    Approved,
    Rejected,
}

impl RequestDecision {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct DecisionForm {
    pub status: RequestDecision,
}

/// Pending requests, newest first.
fn pending() -> Vec<Query> {
    vec![
        Query::equal("status", REQUEST_STATUS_PENDING),
        Query::order_desc("$createdAt"),
    ]
}

pub(crate) async fn load_pending(
    state: &SharedState,
    scope: &ViewScope,
) -> Result<ListView<VolunteerRequest>, ViewError> {
    let queries = pending();
    let collection = &state.collections().volunteer_requests;
    ListView::load(state, scope, collection, &queries).await
}

#[utoipa::path(
    post,
    path = "/request",
    request_body = RequestForm,
    responses(
        (status = 201, description = "Request submitted with status pending"),
        (status = 422, description = "Missing required field", body = NoticeBody),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "requests"
)]
pub async fn submit_request(
    state: Extension<SharedState>,
    scope: ViewScope,
    payload: Option<Json<RequestForm>>,
) -> Response {
    let form = match require_payload(payload) {
        Ok(form) => form,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = form.validate() {
        return err.into_response();
    }

    let request = VolunteerRequest {
        volunteer_name: form.volunteer_name.trim().to_string(),
        message: form.message.trim().to_string(),
        status: REQUEST_STATUS_PENDING.to_string(),
    };

    let created = scope
        .run(state.databases().create::<VolunteerRequest, _>(
            &state.collections().volunteer_requests,
            &unique_id(),
            &request,
        ))
        .await;

    match created {
        Ok(document) => (
            StatusCode::CREATED,
            Json(SubmittedRequest {
                document,
                notice: Notice::success("Request submitted successfully!"),
            }),
        )
            .into_response(),
        Err(err) => ViewError::backend("Failed to submit request", &err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/requests",
    responses(
        (status = 200, description = "Pending volunteer requests, newest first"),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "requests"
)]
pub async fn list_requests(
    state: Extension<SharedState>,
    scope: ViewScope,
) -> Result<ListView<VolunteerRequest>, ViewError> {
    load_pending(&state, &scope).await
}

#[utoipa::path(
    patch,
    path = "/requests/{id}",
    params(("id" = String, Path, description = "Volunteer request id")),
    request_body = DecisionForm,
    responses(
        (status = 200, description = "Request settled and removed from the pending list"),
        (status = 403, description = "Only orphanages may settle requests", body = NoticeBody),
        (status = 404, description = "Not a pending request")
    ),
    tag = "requests"
)]
/// Approve or reject a pending request. Like opportunity creation, the role
/// is looked up again rather than read from the client cache.
pub async fn decide_request(
    headers: HeaderMap,
    state: Extension<SharedState>,
    principal: Extension<Principal>,
    scope: ViewScope,
    Path(id): Path<String>,
    payload: Option<Json<DecisionForm>>,
) -> Response {
    let form = match require_payload(payload) {
        Ok(form) => form,
        Err(err) => return err.into_response(),
    };

    let mut cache = RoleCache::from_headers(&headers);
    let role = resolve_role(&state, &scope, &principal.user_id, &mut cache).await;
    let mut response_headers = HeaderMap::new();
    cache.write_to(&mut response_headers);

    if role != Some(Role::Orphanage) {
        info!(user_id = %principal.user_id, "Request decision refused");
        let err = ViewError::Forbidden("Only orphanages can settle requests.".to_string());
        return (response_headers, err).into_response();
    }

    let mut view = match load_pending(&state, &scope).await {
        Ok(view) => view,
        Err(err) => return (response_headers, err).into_response(),
    };

    let patch = json!({"status": form.status.as_str()});
    let outcome = view.update_and_remove(&state, &scope, &id, &patch).await;
    let message = match form.status {
        RequestDecision::Approved => "Request approved.",
        RequestDecision::Rejected => "Request rejected.",
    };
    (response_headers, view.respond(outcome, message)).into_response()
}
