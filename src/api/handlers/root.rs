use axum::{http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::auth::{landing_path, RoleCache};

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Landing {
    pub name: String,
    pub login: String,
    pub signup: String,
    /// Landing page of the cached role, `/home` when nothing is cached.
    pub dashboard: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Public landing links", body = Landing)
    ),
    tag = "root"
)]
/// Public landing page. Reads only the client role cache; no backend call.
pub async fn root(headers: HeaderMap) -> Json<Landing> {
    let role = RoleCache::from_headers(&headers).get();
    Json(Landing {
        name: env!("CARGO_PKG_NAME").to_string(),
        login: "/login".to_string(),
        signup: "/signup".to_string(),
        dashboard: landing_path(role.as_ref()).to_string(),
    })
}
