//! Children profiles: list, detail, create, edit and confirmed delete.

use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::auth::Principal;
use crate::api::records::ChildProfile;
use crate::api::views::{
    require, require_payload, split_list, ConfirmQuery, ListView, NoticeBody, Validate, ViewError,
    ViewScope,
};
use crate::api::SharedState;
use crate::appwrite::Document;

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChildForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub education_status: String,
    #[serde(default)]
    pub health_status: String,
    /// Comma separated.
    #[serde(default)]
    pub hobbies: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl Validate for ChildForm {
    fn validate(&self) -> Result<(), ViewError> {
        require("Name", &self.name)?;
        require("Bio", &self.bio)?;
        require("Education status", &self.education_status)?;
        require("Health status", &self.health_status)
    }
}

impl ChildForm {
    fn into_profile(self, created_by: &str) -> ChildProfile {
        ChildProfile {
            name: self.name.trim().to_string(),
            age: self.age,
            bio: self.bio.trim().to_string(),
            education_status: self.education_status.trim().to_string(),
            health_status: self.health_status.trim().to_string(),
            hobbies: split_list(&self.hobbies),
            photo_url: self.photo_url.filter(|url| !url.trim().is_empty()),
            created_by: Some(created_by.to_string()),
        }
    }
}

/// Partial edit; only the given fields change.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChildUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub bio: Option<String>,
    pub education_status: Option<String>,
    pub health_status: Option<String>,
    /// Comma separated.
    pub hobbies: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Serialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
struct ChildPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    education_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    health_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hobbies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<String>,
}

impl Validate for ChildUpdate {
    fn validate(&self) -> Result<(), ViewError> {
        let fields = [
            ("Name", &self.name),
            ("Bio", &self.bio),
            ("Education status", &self.education_status),
            ("Health status", &self.health_status),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                require(field, value)?;
            }
        }
        if self.patch() == ChildPatch::default() {
            return Err(ViewError::Validation("Nothing to update.".to_string()));
        }
        Ok(())
    }
}

impl ChildUpdate {
    fn patch(&self) -> ChildPatch {
        let trimmed = |value: &Option<String>| value.as_deref().map(|v| v.trim().to_string());
        ChildPatch {
            name: trimmed(&self.name),
            age: self.age,
            bio: trimmed(&self.bio),
            education_status: trimmed(&self.education_status),
            health_status: trimmed(&self.health_status),
            hobbies: self.hobbies.as_deref().map(split_list),
            photo_url: trimmed(&self.photo_url),
        }
    }
}

async fn load(
    state: &SharedState,
    scope: &ViewScope,
) -> Result<ListView<ChildProfile>, ViewError> {
    ListView::load(state, scope, &state.collections().children, &[]).await
}

#[utoipa::path(
    get,
    path = "/children",
    responses(
        (status = 200, description = "Children profiles"),
        (status = 303, description = "No session; redirect to login"),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "children"
)]
pub async fn list_children(
    state: Extension<SharedState>,
    scope: ViewScope,
) -> Result<ListView<ChildProfile>, ViewError> {
    load(&state, &scope).await
}

#[utoipa::path(
    get,
    path = "/children/{id}",
    params(("id" = String, Path, description = "Child profile id")),
    responses(
        (status = 200, description = "Child profile", body = ChildProfile),
        (status = 404, description = "Unknown child", body = NoticeBody)
    ),
    tag = "children"
)]
pub async fn child_detail(
    state: Extension<SharedState>,
    scope: ViewScope,
    Path(id): Path<String>,
) -> Result<Json<Document<ChildProfile>>, ViewError> {
    scope
        .run(state.databases().get(&state.collections().children, &id))
        .await
        .map(Json)
        .map_err(|err| ViewError::backend("Failed to load child profile", &err))
}

#[utoipa::path(
    post,
    path = "/children",
    request_body = ChildForm,
    responses(
        (status = 200, description = "Profile created; patched list"),
        (status = 422, description = "Missing required field", body = NoticeBody),
        (status = 502, description = "Backend failure; prior list returned")
    ),
    tag = "children"
)]
pub async fn create_child(
    state: Extension<SharedState>,
    principal: Extension<Principal>,
    scope: ViewScope,
    payload: Option<Json<ChildForm>>,
) -> Response {
    let form = match require_payload(payload) {
        Ok(form) => form,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = form.validate() {
        return err.into_response();
    }

    let mut view = match load(&state, &scope).await {
        Ok(view) => view,
        Err(err) => return err.into_response(),
    };

    let profile = form.into_profile(&principal.user_id);
    let outcome = view.create(&state, &scope, &profile).await;
    view.respond(outcome, "Child profile created successfully!")
}

#[utoipa::path(
    patch,
    path = "/children/{id}",
    params(("id" = String, Path, description = "Child profile id")),
    request_body = ChildUpdate,
    responses(
        (status = 200, description = "Profile updated; patched list"),
        (status = 404, description = "Unknown child"),
        (status = 422, description = "Invalid edit", body = NoticeBody)
    ),
    tag = "children"
)]
pub async fn update_child(
    state: Extension<SharedState>,
    scope: ViewScope,
    Path(id): Path<String>,
    payload: Option<Json<ChildUpdate>>,
) -> Response {
    let update = match require_payload(payload) {
        Ok(update) => update,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = update.validate() {
        return err.into_response();
    }

    let mut view = match load(&state, &scope).await {
        Ok(view) => view,
        Err(err) => return err.into_response(),
    };

    let outcome = view.update(&state, &scope, &id, &update.patch()).await;
    view.respond(outcome, "Child profile updated.")
}

#[utoipa::path(
    delete,
    path = "/children/{id}",
    params(
        ("id" = String, Path, description = "Child profile id"),
        ConfirmQuery
    ),
    responses(
        (status = 200, description = "Profile deleted; patched list"),
        (status = 400, description = "Not confirmed; nothing deleted", body = NoticeBody)
    ),
    tag = "children"
)]
pub async fn delete_child(
    state: Extension<SharedState>,
    scope: ViewScope,
    Path(id): Path<String>,
    Query(confirm): Query<ConfirmQuery>,
) -> Response {
    let confirmed = match confirm.confirmed() {
        Ok(confirmed) => confirmed,
        Err(err) => return err.into_response(),
    };

    let mut view = match load(&state, &scope).await {
        Ok(view) => view,
        Err(err) => return err.into_response(),
    };

    let outcome = view.delete(&state, &scope, &id, confirmed).await;
    view.respond(outcome, "Child profile deleted.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_into_profile_splits_hobbies() {
        let form = ChildForm {
            name: " Mwila ".into(),
            bio: "Loves school".into(),
            education_status: "Grade 3".into(),
            health_status: "Healthy".into(),
            hobbies: "football, drawing".into(),
            photo_url: Some(String::new()),
            ..ChildForm::default()
        };
        assert!(form.validate().is_ok());
        let profile = form.into_profile("user-1");
        assert_eq!(profile.name, "Mwila");
        assert_eq!(profile.hobbies, vec!["football", "drawing"]);
        assert!(profile.photo_url.is_none());
        assert_eq!(profile.created_by.as_deref(), Some("user-1"));
    }

    #[test]
    fn form_requires_name() {
        let form = ChildForm {
            bio: "x".into(),
            education_status: "x".into(),
            health_status: "x".into(),
            ..ChildForm::default()
        };
        assert!(matches!(form.validate(), Err(ViewError::Validation(_))));
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(ChildUpdate::default().validate().is_err());
        let blank_name = ChildUpdate {
            name: Some(" ".into()),
            ..ChildUpdate::default()
        };
        assert!(blank_name.validate().is_err());
    }

    #[test]
    fn update_patch_only_has_given_fields() {
        let update = ChildUpdate {
            hobbies: Some("reading,".into()),
            age: Some(9),
            ..ChildUpdate::default()
        };
        assert!(update.validate().is_ok());
        let value = serde_json::to_value(update.patch()).unwrap_or_default();
        assert_eq!(value, serde_json::json!({"age": 9, "hobbies": ["reading"]}));
    }
}
