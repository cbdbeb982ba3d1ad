//! Volunteer profiles.

use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::valid_email;
use crate::api::records::{CommunicationMethod, VolunteerProfile};
use crate::api::views::{
    require, require_payload, split_list, ConfirmQuery, ListView, NoticeBody, Validate, ViewError,
    ViewScope,
};
use crate::api::SharedState;
use crate::appwrite::Document;

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_picture_url: String,
    #[serde(default)]
    pub bio: String,
    /// Comma separated.
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub availability: bool,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub communication_method: CommunicationMethod,
}

impl Validate for VolunteerForm {
    fn validate(&self) -> Result<(), ViewError> {
        require("Name", &self.name)?;
        require("Bio", &self.bio)?;
        require("Location", &self.location)?;
        require("Email", &self.email)?;
        if !valid_email(self.email.trim()) {
            return Err(ViewError::Validation("Invalid email address.".to_string()));
        }
        if self.communication_method == CommunicationMethod::Phone {
            let phone = self.phone_number.as_deref().unwrap_or_default();
            require("Phone number", phone)?;
        }
        Ok(())
    }
}

impl VolunteerForm {
    fn into_profile(self) -> VolunteerProfile {
        VolunteerProfile {
            name: self.name.trim().to_string(),
            profile_picture_url: self.profile_picture_url.trim().to_string(),
            bio: self.bio.trim().to_string(),
            skills: split_list(&self.skills),
            location: self.location.trim().to_string(),
            availability: self.availability,
            email: self.email.trim().to_string(),
            phone_number: self
                .phone_number
                .map(|phone| phone.trim().to_string())
                .filter(|phone| !phone.is_empty()),
            communication_method: self.communication_method,
        }
    }
}

/// Partial edit; only the given fields change. A new photo is uploaded through
/// `/photos` first and its view URL passed as `profilePictureUrl`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerUpdate {
    pub name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub bio: Option<String>,
    /// Comma separated.
    pub skills: Option<String>,
    pub location: Option<String>,
    pub availability: Option<bool>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Serialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
struct VolunteerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile_picture_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    availability: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
}

impl Validate for VolunteerUpdate {
    fn validate(&self) -> Result<(), ViewError> {
        // A phone number can be replaced but not cleared, so phone contact
        // always has a number to use.
        let fields = [
            ("Name", &self.name),
            ("Bio", &self.bio),
            ("Location", &self.location),
            ("Email", &self.email),
            ("Phone number", &self.phone_number),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                require(field, value)?;
            }
        }
        if let Some(email) = &self.email {
            if !valid_email(email.trim()) {
                return Err(ViewError::Validation("Invalid email address.".to_string()));
            }
        }
        if self.patch() == VolunteerPatch::default() {
            return Err(ViewError::Validation("Nothing to update.".to_string()));
        }
        Ok(())
    }
}

impl VolunteerUpdate {
    fn patch(&self) -> VolunteerPatch {
        let trimmed = |value: &Option<String>| value.as_deref().map(|v| v.trim().to_string());
        VolunteerPatch {
            name: trimmed(&self.name),
            profile_picture_url: trimmed(&self.profile_picture_url),
            bio: trimmed(&self.bio),
            skills: self.skills.as_deref().map(split_list),
            location: trimmed(&self.location),
            availability: self.availability,
            email: trimmed(&self.email),
            phone_number: trimmed(&self.phone_number),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdate {
    pub communication_method: CommunicationMethod,
}

async fn load(
    state: &SharedState,
    scope: &ViewScope,
) -> Result<ListView<VolunteerProfile>, ViewError> {
    ListView::load(state, scope, &state.collections().volunteers, &[]).await
}

#[utoipa::path(
    get,
    path = "/volunteers",
    responses(
        (status = 200, description = "Volunteer profiles"),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "volunteers"
)]
pub async fn list_volunteers(
    state: Extension<SharedState>,
    scope: ViewScope,
) -> Result<ListView<VolunteerProfile>, ViewError> {
    load(&state, &scope).await
}

#[utoipa::path(
    get,
    path = "/volunteer-details/{id}",
    params(("id" = String, Path, description = "Volunteer profile id")),
    responses(
        (status = 200, description = "Volunteer profile", body = VolunteerProfile),
        (status = 404, description = "Unknown volunteer", body = NoticeBody)
    ),
    tag = "volunteers"
)]
pub async fn volunteer_detail(
    state: Extension<SharedState>,
    scope: ViewScope,
    Path(id): Path<String>,
) -> Result<Json<Document<VolunteerProfile>>, ViewError> {
    scope
        .run(state.databases().get(&state.collections().volunteers, &id))
        .await
        .map(Json)
        .map_err(|err| ViewError::backend("Failed to load volunteer profile", &err))
}

#[utoipa::path(
    post,
    path = "/volunteers",
    request_body = VolunteerForm,
    responses(
        (status = 200, description = "Profile created; patched list"),
        (status = 422, description = "Missing required field", body = NoticeBody),
        (status = 502, description = "Backend failure; prior list returned")
    ),
    tag = "volunteers"
)]
pub async fn create_volunteer(
    state: Extension<SharedState>,
    scope: ViewScope,
    payload: Option<Json<VolunteerForm>>,
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

    let outcome = view.create(&state, &scope, &form.into_profile()).await;
    view.respond(outcome, "Volunteer profile created successfully")
}

#[utoipa::path(
    patch,
    path = "/volunteers/{id}",
    params(("id" = String, Path, description = "Volunteer profile id")),
    request_body = VolunteerUpdate,
    responses(
        (status = 200, description = "Profile updated; patched list"),
        (status = 404, description = "Unknown volunteer"),
        (status = 422, description = "Invalid edit", body = NoticeBody)
    ),
    tag = "volunteers"
)]
pub async fn update_volunteer(
    state: Extension<SharedState>,
    scope: ViewScope,
    Path(id): Path<String>,
    payload: Option<Json<VolunteerUpdate>>,
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
    view.respond(outcome, "Volunteer profile updated!")
}

#[utoipa::path(
    patch,
    path = "/volunteers/{id}/contact",
    params(("id" = String, Path, description = "Volunteer profile id")),
    request_body = ContactUpdate,
    responses(
        (status = 200, description = "Preferred contact updated; patched list"),
        (status = 404, description = "Unknown volunteer"),
        (status = 422, description = "Phone chosen without a phone number", body = NoticeBody)
    ),
    tag = "volunteers"
)]
pub async fn update_contact(
    state: Extension<SharedState>,
    scope: ViewScope,
    Path(id): Path<String>,
    payload: Option<Json<ContactUpdate>>,
) -> Response {
    let update = match require_payload(payload) {
        Ok(update) => update,
        Err(err) => return err.into_response(),
    };

    let mut view = match load(&state, &scope).await {
        Ok(view) => view,
        Err(err) => return err.into_response(),
    };

    // Unlisted ids fall through to the 404 from `update`.
    let missing_phone = view.find(&id).is_some_and(|volunteer| {
        volunteer
            .data
            .phone_number
            .as_deref()
            .map_or(true, |phone| phone.trim().is_empty())
    });
    if update.communication_method == CommunicationMethod::Phone && missing_phone {
        let err = ViewError::Validation(
            "Add a phone number before choosing phone contact.".to_string(),
        );
        return view.respond::<()>(Err(err), "");
    }

    let patch = json!({"communicationMethod": update.communication_method});
    let outcome = view.update(&state, &scope, &id, &patch).await;
    view.respond(outcome, "Preferred contact method updated.")
}

#[utoipa::path(
    delete,
    path = "/volunteers/{id}",
    params(
        ("id" = String, Path, description = "Volunteer profile id"),
        ConfirmQuery
    ),
    responses(
        (status = 200, description = "Profile deleted; patched list"),
        (status = 400, description = "Not confirmed; nothing deleted", body = NoticeBody)
    ),
    tag = "volunteers"
)]
pub async fn delete_volunteer(
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
    view.respond(outcome, "Volunteer profile deleted.")
}
