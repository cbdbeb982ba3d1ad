//! Role resolution, post-login routing and the client role cache.
//!
//! The role lives in the `role` attribute of the user's document. After it is
//! resolved it is cached on the client under `userRole` (last write wins, no
//! expiry). The cache may be stale and only decides which sidebar actions are
//! shown; it is never used for authorization.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tracing::{debug, error, instrument};
use url::form_urlencoded;
use utoipa::ToSchema;

use super::principal::Principal;
use super::session::cookie_value;
use crate::api::records::UserProfile;
use crate::api::state::AppState;
use crate::api::views::ViewScope;
use crate::api::SharedState;

pub const ROLE_CACHE_KEY: &str = "userRole";

/// 400 days, the longest lifetime browsers keep.
const ROLE_CACHE_MAX_AGE: u64 = 400 * 24 * 60 * 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Donor,
    Volunteer,
    Orphanage,
    Other(String),
}

impl Role {
    /// Exact, case-sensitive parse. Empty means "no role".
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "" => None,
            "donor" => Some(Self::Donor),
            "volunteer" => Some(Self::Volunteer),
            "orphanage" => Some(Self::Orphanage),
            other => Some(Self::Other(other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Donor => "donor",
            Self::Volunteer => "volunteer",
            Self::Orphanage => "orphanage",
            Self::Other(value) => value,
        }
    }
}

/// Post-login destination for a resolved role.
#[must_use]
pub fn landing_path(role: Option<&Role>) -> &'static str {
    match role {
        Some(Role::Donor) => "/board",
        Some(Role::Volunteer) => "/volunteer",
        Some(Role::Orphanage) => "/orphanage",
        Some(Role::Other(_)) | None => "/home",
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq, ToSchema)]
pub struct SidebarAction {
    pub label: &'static str,
    pub path: &'static str,
    pub enabled: bool,
}

const fn action(label: &'static str, path: &'static str) -> SidebarAction {
    SidebarAction {
        label,
        path,
        enabled: true,
    }
}

/// Sidebar entries shown for the cached role. The volunteers entry of the
/// default sidebar is disabled while no opportunity is available.
#[must_use]
pub fn sidebar_actions(role: Option<&Role>, opportunities_available: bool) -> Vec<SidebarAction> {
    match role {
        Some(Role::Orphanage) => vec![
            action("Dashboard Overview", "/orphanage"),
            action("Manage Children Profiles", "/children-page"),
            action("Manage Volunteers", "/volunteers"),
            action("View Donations", "/donation-details"),
            action("Create New Opportunity", "/opportunity"),
        ],
        Some(Role::Volunteer) => vec![
            action("Home", "/home"),
            action("Child Form", "/create-child-profile"),
            action("Donate", "/board"),
            action("Our Children", "/children-page"),
            action("Make Request", "/request"),
        ],
        Some(Role::Donor) => vec![
            action("Home", "/home"),
            action("Donate", "/board"),
            action("Donate Goods", "/goods"),
        ],
        Some(Role::Other(_)) | None => vec![
            action("Home", "/home"),
            action("Donate", "/board"),
            SidebarAction {
                enabled: opportunities_available,
                ..action("Volunteers", "/volunteer")
            },
        ],
    }
}

/// Client-side role cache carried in the `userRole` cookie.
#[derive(Clone, Debug, Default)]
pub struct RoleCache {
    value: Option<String>,
    changed: bool,
}

impl RoleCache {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let value = cookie_value(headers, ROLE_CACHE_KEY).and_then(|raw| {
            form_urlencoded::parse(format!("v={raw}").as_bytes())
                .next()
                .map(|(_, decoded)| decoded.into_owned())
        });
        Self {
            value: value.filter(|role| !role.is_empty()),
            changed: false,
        }
    }

    #[must_use]
    pub fn get(&self) -> Option<Role> {
        self.value.as_deref().and_then(Role::parse)
    }

    /// Overwrite the cached role.
    pub fn store(&mut self, role: &Role) {
        self.value = Some(role.as_str().to_string());
        self.changed = true;
    }

    pub fn clear(&mut self) {
        self.value = None;
        self.changed = true;
    }

    /// `Set-Cookie` value reflecting the last write, if any.
    #[must_use]
    pub fn set_cookie(&self) -> Option<HeaderValue> {
        if !self.changed {
            return None;
        }
        let cookie = match &self.value {
            Some(role) => {
                let encoded: String = form_urlencoded::byte_serialize(role.as_bytes()).collect();
                let max_age = ROLE_CACHE_MAX_AGE;
                format!("{ROLE_CACHE_KEY}={encoded}; Path=/; SameSite=Lax; Max-Age={max_age}")
            }
            None => format!("{ROLE_CACHE_KEY}=; Path=/; SameSite=Lax; Max-Age=0"),
        };
        HeaderValue::from_str(&cookie).ok()
    }

    /// Append the cache cookie to response headers when it changed.
    pub fn write_to(&self, headers: &mut HeaderMap) {
        if let Some(cookie) = self.set_cookie() {
            headers.append(SET_COOKIE, cookie);
        }
    }
}

/// Look up the role of a user and cache it.
///
/// Lookup failures, a missing document, and an absent or empty attribute all
/// resolve to `None`; errors are logged, never propagated.
#[instrument(skip(state, scope, cache))]
pub async fn resolve_role(
    state: &AppState,
    scope: &ViewScope,
    user_id: &str,
    cache: &mut RoleCache,
) -> Option<Role> {
    if user_id.is_empty() {
        return None;
    }

    let lookup = scope
        .run(
            state
                .databases()
                .get::<UserProfile>(&state.collections().users, user_id),
        )
        .await;

    let role = match lookup {
        Ok(document) => document.data.role.as_deref().and_then(Role::parse),
        Err(err) => {
            error!("Error fetching user role: {err}");
            None
        }
    };

    match &role {
        Some(role) => cache.store(role),
        None => debug!("No role found for user"),
    }
    role
}

#[utoipa::path(
    get,
    path = "/role",
    responses(
        (status = 303, description = "Redirect to the landing page of the resolved role"),
    ),
    tag = "auth"
)]
/// Re-resolve the role of the current session and redirect to its landing page.
pub async fn role(
    headers: HeaderMap,
    state: Extension<SharedState>,
    principal: Extension<Principal>,
    scope: ViewScope,
) -> Response {
    let mut cache = RoleCache::from_headers(&headers);
    let role = resolve_role(&state, &scope, &principal.user_id, &mut cache).await;

    let mut response_headers = HeaderMap::new();
    cache.write_to(&mut response_headers);
    (response_headers, Redirect::to(landing_path(role.as_ref()))).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::state::test_support::{docs, state};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn role_router_table() {
        let cases = [
            ("donor", "/board"),
            ("volunteer", "/volunteer"),
            ("orphanage", "/orphanage"),
            ("admin", "/home"),
            ("Donor", "/home"),
            ("", "/home"),
        ];
        for (value, expected) in cases {
            let role = Role::parse(value);
            assert_eq!(landing_path(role.as_ref()), expected, "role {value:?}");
        }
        assert_eq!(landing_path(None), "/home");
    }

    #[test]
    fn role_round_trips_as_str() {
        for value in ["donor", "volunteer", "orphanage", "sponsor"] {
            assert_eq!(Role::parse(value).unwrap().as_str(), value);
        }
    }

    #[test]
    fn sidebar_depends_on_role() {
        let orphanage = sidebar_actions(Some(&Role::Orphanage), false);
        assert_eq!(orphanage.len(), 5);
        assert!(orphanage.iter().any(|a| a.path == "/opportunity"));

        let volunteer = sidebar_actions(Some(&Role::Volunteer), false);
        assert!(volunteer.iter().all(|a| a.path != "/opportunity"));

        let default = sidebar_actions(None, false);
        let volunteers = default.iter().find(|a| a.path == "/volunteer").unwrap();
        assert!(!volunteers.enabled);
        let default = sidebar_actions(None, true);
        assert!(default.iter().all(|a| a.enabled));
    }

    #[test]
    fn role_cache_last_write_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("userRole=donor"));
        let mut cache = RoleCache::from_headers(&headers);
        assert_eq!(cache.get(), Some(Role::Donor));
        assert!(cache.set_cookie().is_none());

        cache.store(&Role::Volunteer);
        cache.store(&Role::Orphanage);
        assert_eq!(cache.get(), Some(Role::Orphanage));
        let cookie = cache.set_cookie().unwrap();
        assert!(cookie.to_str().unwrap().starts_with("userRole=orphanage;"));
    }

    #[test]
    fn role_cache_encodes_other_roles() {
        let mut cache = RoleCache::default();
        cache.store(&Role::Other("field worker".to_string()));
        let cookie = cache.set_cookie().unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("userRole=field+worker;"));

        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("userRole=field+worker"));
        assert_eq!(
            RoleCache::from_headers(&headers).get(),
            Some(Role::Other("field worker".to_string()))
        );
    }

    #[test]
    fn role_cache_clear_expires_cookie() {
        let mut cache = RoleCache::default();
        cache.clear();
        assert!(cache.get().is_none());
        let cookie = cache.set_cookie().unwrap();
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn resolve_role_reads_user_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/user-1", docs("users"))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$id": "user-1",
                "username": "home",
                "email": "home@example.org",
                "accountId": "user-1",
                "role": "orphanage"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = state(&server.uri());
        let mut cache = RoleCache::default();
        let role = resolve_role(&state, &ViewScope::new(), "user-1", &mut cache).await;
        assert_eq!(role, Some(Role::Orphanage));
        assert_eq!(cache.get(), Some(Role::Orphanage));
    }

    #[tokio::test]
    async fn resolve_role_failure_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/user-1", docs("users"))))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let state = state(&server.uri());
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("userRole=donor"));
        let mut cache = RoleCache::from_headers(&headers);
        let role = resolve_role(&state, &ViewScope::new(), "user-1", &mut cache).await;
        assert!(role.is_none());
        // a failed lookup leaves the previous cache entry alone
        assert_eq!(cache.get(), Some(Role::Donor));
        assert!(cache.set_cookie().is_none());
    }

    #[tokio::test]
    async fn resolve_role_empty_attribute_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/user-2", docs("users"))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$id": "user-2",
                "username": "ann",
                "role": ""
            })))
            .mount(&server)
            .await;

        let state = state(&server.uri());
        let mut cache = RoleCache::default();
        let role = resolve_role(&state, &ViewScope::new(), "user-2", &mut cache).await;
        assert!(role.is_none());
        assert!(cache.set_cookie().is_none());
    }

    #[tokio::test]
    async fn resolve_role_skips_empty_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let state = state(&server.uri());
        let mut cache = RoleCache::default();
        assert!(resolve_role(&state, &ViewScope::new(), "", &mut cache)
            .await
            .is_none());
    }
}
