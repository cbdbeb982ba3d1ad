//! Profile of the signed-in user, read from the `users` document.

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::auth::Principal;
use crate::api::records::UserProfile;
use crate::api::views::{NoticeBody, ViewError, ViewScope};
use crate::api::SharedState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Option<String>,
    /// First letter of each word of the username, upper-cased.
    pub initials: String,
}

fn initials(username: &str) -> String {
    username
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Username, email and role of the signed-in user", body = ProfileResponse),
        (status = 303, description = "No session; redirect to login"),
        (status = 404, description = "No user document", body = NoticeBody),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "auth"
)]
pub async fn profile(
    state: Extension<SharedState>,
    principal: Extension<Principal>,
    scope: ViewScope,
) -> Result<Json<ProfileResponse>, ViewError> {
    let document = scope
        .run(
            state
                .databases()
                .get::<UserProfile>(&state.collections().users, &principal.user_id),
        )
        .await
        .map_err(|err| ViewError::backend("Failed to fetch user profile", &err))?;

    let user = document.data;
    let email = if user.email.is_empty() {
        principal.email.clone()
    } else {
        user.email
    };

    Ok(Json(ProfileResponse {
        id: document.id,
        initials: initials(&user.username),
        username: user.username,
        email,
        role: user.role.filter(|role| !role.is_empty()),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::state::test_support::{docs, state};
    use axum::http::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn principal() -> Principal {
        Principal {
            user_id: "u1".into(),
            email: "ann@example.org".into(),
            name: "Ann".into(),
        }
    }

    #[test]
    fn initials_take_first_letter_of_each_word() {
        assert_eq!(initials("hope house"), "HH");
        assert_eq!(initials("  ann  "), "A");
        assert_eq!(initials(""), "");
    }

    #[tokio::test]
    async fn profile_reads_user_document_of_principal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/u1", docs("users"))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$id": "u1",
                "username": "Ann Banda",
                "email": "",
                "accountId": "u1",
                "role": "volunteer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let Json(profile) = profile(
            Extension(state(&server.uri())),
            Extension(principal()),
            ViewScope::new(),
        )
        .await
        .unwrap();

        assert_eq!(
            profile,
            ProfileResponse {
                id: "u1".into(),
                username: "Ann Banda".into(),
                email: "ann@example.org".into(),
                role: Some("volunteer".into()),
                initials: "AB".into(),
            }
        );
    }

    #[tokio::test]
    async fn missing_user_document_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Document with the requested ID could not be found.",
                "code": 404,
                "type": "document_not_found"
            })))
            .mount(&server)
            .await;

        let err = profile(
            Extension(state(&server.uri())),
            Extension(principal()),
            ViewScope::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
