//! Volunteer opportunities posted by orphanages.

use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use super::auth::{resolve_role, Principal, Role, RoleCache};
use crate::api::records::Opportunity;
use crate::api::views::{
    require, require_payload, ListView, NoticeBody, Validate, ViewError, ViewScope,
};
use crate::api::SharedState;
use crate::appwrite::Query;

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
}

impl Validate for OpportunityForm {
    fn validate(&self) -> Result<(), ViewError> {
        require("Title", &self.title)?;
        require("Description", &self.description)?;
        require("Date", &self.date)?;
        require("Location", &self.location)
    }
}

impl OpportunityForm {
    fn into_opportunity(self) -> Opportunity {
        Opportunity {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            date: self.date.trim().to_string(),
            location: self.location.trim().to_string(),
            is_available: true,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityUpdate {
    pub is_available: bool,
}

/// Queries selecting opportunities still open to volunteers.
pub(crate) fn available() -> Vec<Query> {
    vec![Query::equal("isAvailable", true)]
}

#[utoipa::path(
    get,
    path = "/opportunities",
    responses(
        (status = 200, description = "Available opportunities"),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "opportunities"
)]
pub async fn list_opportunities(
    state: Extension<SharedState>,
    scope: ViewScope,
) -> Result<ListView<Opportunity>, ViewError> {
    let collection = &state.collections().opportunities;
    ListView::load(&state, &scope, collection, &available()).await
}

#[utoipa::path(
    post,
    path = "/opportunity",
    request_body = OpportunityForm,
    responses(
        (status = 200, description = "Opportunity created; patched list ordered by date"),
        (status = 403, description = "Only orphanages may post opportunities", body = NoticeBody),
        (status = 422, description = "Missing required field", body = NoticeBody)
    ),
    tag = "opportunities"
)]
/// Post a new opportunity. The role is looked up again rather than read from
/// the client cache.
pub async fn create_opportunity(
    headers: HeaderMap,
    state: Extension<SharedState>,
    principal: Extension<Principal>,
    scope: ViewScope,
    payload: Option<Json<OpportunityForm>>,
) -> Response {
    let form = match require_payload(payload) {
        Ok(form) => form,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = form.validate() {
        return err.into_response();
    }

    let mut cache = RoleCache::from_headers(&headers);
    let role = resolve_role(&state, &scope, &principal.user_id, &mut cache).await;
    let mut response_headers = HeaderMap::new();
    cache.write_to(&mut response_headers);

    if role != Some(Role::Orphanage) {
        info!(user_id = %principal.user_id, "Opportunity creation refused");
        let err = ViewError::Forbidden("Only orphanages can create opportunities.".to_string());
        return (response_headers, err).into_response();
    }

    let queries = [Query::order_asc("date")];
    let mut view = match ListView::<Opportunity>::load(
        &state,
        &scope,
        &state.collections().opportunities,
        &queries,
    )
    .await
    {
        Ok(view) => view,
        Err(err) => return (response_headers, err).into_response(),
    };

    let outcome = view.create(&state, &scope, &form.into_opportunity()).await;
    (
        response_headers,
        view.respond(outcome, "Opportunity created successfully!"),
    )
        .into_response()
}

#[utoipa::path(
    patch,
    path = "/opportunities/{id}/availability",
    params(("id" = String, Path, description = "Opportunity id")),
    request_body = AvailabilityUpdate,
    responses(
        (status = 200, description = "Availability changed; patched list"),
        (status = 404, description = "Unknown opportunity")
    ),
    tag = "opportunities"
)]
pub async fn update_availability(
    state: Extension<SharedState>,
    scope: ViewScope,
    Path(id): Path<String>,
    payload: Option<Json<AvailabilityUpdate>>,
) -> Response {
    let update = match require_payload(payload) {
        Ok(update) => update,
        Err(err) => return err.into_response(),
    };
    let queries = [Query::order_asc("date")];
    let mut view = match ListView::<Opportunity>::load(
        &state,
        &scope,
        &state.collections().opportunities,
        &queries,
    )
    .await
    {
        Ok(view) => view,
        Err(err) => return err.into_response(),
    };

    let patch = json!({"isAvailable": update.is_available});
    let outcome = view.update(&state, &scope, &id, &patch).await;
    let message = if update.is_available {
        "Opportunity reopened."
    } else {
        "Opportunity closed."
    };
    view.respond(outcome, message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::state::test_support::{docs, state};
    use axum::http::{header::SET_COOKIE, StatusCode};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn principal() -> Principal {
        Principal {
            user_id: "u1".into(),
            email: "home@example.org".into(),
            name: "Home".into(),
        }
    }

    fn form() -> OpportunityForm {
        OpportunityForm {
            title: "Reading club".into(),
            description: "Read with the kids".into(),
            date: "2026-11-01".into(),
            location: "Ndola".into(),
        }
    }

    async fn mount_role(server: &MockServer, role: &str) {
        Mock::given(method("GET"))
            .and(path(format!("{}/u1", docs("users"))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$id": "u1",
                "role": role
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn new_opportunity_is_available() {
        assert!(form().validate().is_ok());
        assert!(form().into_opportunity().is_available);
        let blank = OpportunityForm {
            date: " ".into(),
            ..form()
        };
        assert!(blank.validate().is_err());
    }

    #[tokio::test]
    async fn non_orphanage_cannot_create() {
        let server = MockServer::start().await;
        mount_role(&server, "donor").await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let response = create_opportunity(
            HeaderMap::new(),
            Extension(state(&server.uri())),
            Extension(principal()),
            ViewScope::new(),
            Some(Json(form())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("userRole=donor"));
    }

    #[tokio::test]
    async fn orphanage_creates_available_opportunity() {
        let server = MockServer::start().await;
        mount_role(&server, "orphanage").await;
        Mock::given(method("GET"))
            .and(path(docs("volunteer_opportunities")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 0,
                "documents": []
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(docs("volunteer_opportunities")))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": "o1",
                "title": "Reading club",
                "isAvailable": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = create_opportunity(
            HeaderMap::new(),
            Extension(state(&server.uri())),
            Extension(principal()),
            ViewScope::new(),
            Some(Json(form())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let requests = server.received_requests().await.unwrap();
        let created = requests
            .iter()
            .find(|request| request.method.as_str() == "POST")
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&created.body).unwrap();
        assert_eq!(body["data"]["isAvailable"], json!(true));
    }
}
