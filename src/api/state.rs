//! Application context shared by every handler.
//!
//! One backend client per process, plus the identifiers and tunables the views
//! need. Handlers receive it as `Extension<Arc<AppState>>`.

use crate::appwrite::{Appwrite, DatabasesApi};
use std::sync::Arc;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

/// Collection ids in the document database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collections {
    pub users: String,
    pub children: String,
    pub volunteers: String,
    pub opportunities: String,
    pub child_donations: String,
    pub orphanage_donations: String,
    pub goods_donations: String,
    pub volunteer_requests: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            users: "users".to_string(),
            children: "children".to_string(),
            volunteers: "volunteers".to_string(),
            opportunities: "volunteer_opportunities".to_string(),
            child_donations: "child_donations".to_string(),
            orphanage_donations: "orphanage_donations".to_string(),
            goods_donations: "goods_donations".to_string(),
            volunteer_requests: "volunteer_requests".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WebConfig {
    frontend_base_url: String,
    payment_link: Option<String>,
    session_ttl_seconds: i64,
}

impl WebConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            payment_link: None,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_payment_link(mut self, payment_link: Option<String>) -> Self {
        self.payment_link = payment_link.filter(|link| !link.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn payment_link(&self) -> Option<&str> {
        self.payment_link.as_deref()
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }

    /// Where password recovery mails point to.
    #[must_use]
    pub fn recovery_url(&self) -> String {
        format!(
            "{}/reset-password",
            self.frontend_base_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug)]
pub struct AppState {
    appwrite: Appwrite,
    database_id: String,
    bucket_id: String,
    collections: Collections,
    config: WebConfig,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    #[must_use]
    pub fn new(
        appwrite: Appwrite,
        database_id: String,
        bucket_id: String,
        collections: Collections,
        config: WebConfig,
    ) -> Self {
        Self {
            appwrite,
            database_id,
            bucket_id,
            collections,
            config,
        }
    }

    #[must_use]
    pub fn appwrite(&self) -> &Appwrite {
        &self.appwrite
    }

    #[must_use]
    pub fn databases(&self) -> DatabasesApi<'_> {
        self.appwrite.databases(&self.database_id)
    }

    #[must_use]
    pub fn bucket_id(&self) -> &str {
        &self.bucket_id
    }

    #[must_use]
    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.config
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{AppState, Collections, SharedState, WebConfig};
    use crate::appwrite::test_support::client;
    use std::sync::Arc;

    pub const DATABASE: &str = "main";

    /// Documents path of a collection on the mock backend.
    pub fn docs(collection: &str) -> String {
        format!("/v1/databases/{DATABASE}/collections/{collection}/documents")
    }

    pub fn state(uri: &str) -> SharedState {
        Arc::new(AppState::new(
            client(uri),
            DATABASE.to_string(),
            "photos".to_string(),
            Collections::default(),
            WebConfig::new("http://localhost:8080".to_string())
                .with_payment_link(Some("https://pay.example.org/zamcare".to_string())),
        ))
    }
}
