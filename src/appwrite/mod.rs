//! Typed client for the Appwrite-compatible backend.
//!
//! The backend owns accounts, sessions, documents and files. This module only
//! speaks its REST API: every response is decoded into a typed record at the
//! boundary, and a shape mismatch surfaces as [`AppwriteError::Decode`] instead
//! of propagating loosely typed JSON into the views.
//!
//! Three credentials are in play:
//! - `X-Appwrite-Project` on every request.
//! - `X-Appwrite-Key` (server key) for databases, storage and session creation.
//! - `X-Appwrite-Session` (user session secret) for calls made as the user.

pub mod account;
pub mod databases;
mod error;
pub mod models;
pub mod query;
pub mod storage;

pub use account::AccountApi;
pub use databases::DatabasesApi;
pub use error::AppwriteError;
pub use models::{Account, Document, DocumentList, Session, StoredFile};
pub use query::Query;
pub use storage::StorageApi;

use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};
use ulid::Ulid;
use url::Url;

use crate::APP_USER_AGENT;

const HEADER_PROJECT: &str = "X-Appwrite-Project";
const HEADER_KEY: &str = "X-Appwrite-Key";
const HEADER_SESSION: &str = "X-Appwrite-Session";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Which credential a request is sent with.
#[derive(Clone, Copy, Debug)]
pub enum Auth<'a> {
    /// Project header only.
    Guest,
    /// Server API key.
    Key,
    /// A user session secret.
    Session(&'a str),
}

#[derive(Clone)]
pub struct AppwriteConfig {
    endpoint: String,
    project_id: String,
    api_key: SecretString,
    timeout: Duration,
}

impl AppwriteConfig {
    #[must_use]
    pub fn new(endpoint: String, project_id: String, api_key: SecretString) -> Self {
        Self {
            endpoint,
            project_id,
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds);
        self
    }
}

impl std::fmt::Debug for AppwriteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppwriteConfig")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Backend client; cheap to share behind the application context.
#[derive(Clone)]
pub struct Appwrite {
    endpoint: String,
    project_id: String,
    api_key: SecretString,
    client: Client,
}

impl Appwrite {
    /// Build the client.
    ///
    /// # Errors
    /// Returns an error if the endpoint is not an absolute http(s) URL or the
    /// HTTP client cannot be built.
    pub fn new(config: AppwriteConfig) -> Result<Self, AppwriteError> {
        let endpoint = normalize_endpoint(&config.endpoint)?;
        if config.project_id.trim().is_empty() {
            return Err(AppwriteError::Config("project id is empty".to_string()));
        }

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|err| AppwriteError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            endpoint,
            project_id: config.project_id,
            api_key: config.api_key,
            client,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    #[must_use]
    pub fn account(&self) -> AccountApi<'_> {
        AccountApi::new(self)
    }

    #[must_use]
    pub fn databases<'a>(&'a self, database_id: &'a str) -> DatabasesApi<'a> {
        DatabasesApi::new(self, database_id)
    }

    #[must_use]
    pub fn storage(&self) -> StorageApi<'_> {
        StorageApi::new(self)
    }

    /// Reachability check used by `/health`.
    ///
    /// # Errors
    /// Returns an error if the backend does not answer `GET /health/version`.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), AppwriteError> {
        let response = self
            .request(Method::GET, "/health/version", Auth::Guest)
            .send()
            .await
            .map_err(AppwriteError::from_reqwest)?;
        expect_empty(response).await
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    pub(crate) fn request(&self, method: Method, path: &str, auth: Auth<'_>) -> RequestBuilder {
        let url = self.url(path);
        debug!(%method, %url, "backend request");

        let builder = self
            .client
            .request(method, url)
            .header(HEADER_PROJECT, &self.project_id);

        match auth {
            Auth::Guest => builder,
            Auth::Key => builder.header(HEADER_KEY, self.api_key.expose_secret()),
            Auth::Session(secret) => builder.header(HEADER_SESSION, secret),
        }
    }
}

impl std::fmt::Debug for Appwrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Appwrite")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &"***")
            .finish_non_exhaustive()
    }
}

/// Fresh backend id (lowercase ULID, valid as a document, account or file id).
#[must_use]
pub fn unique_id() -> String {
    Ulid::new().to_string().to_lowercase()
}

fn normalize_endpoint(endpoint: &str) -> Result<String, AppwriteError> {
    let parsed = Url::parse(endpoint.trim())
        .map_err(|err| AppwriteError::Config(format!("invalid endpoint {endpoint}: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppwriteError::Config(format!(
                "unsupported endpoint scheme: {scheme}"
            )))
        }
    }
    if parsed.host_str().is_none() {
        return Err(AppwriteError::Config(format!(
            "endpoint must include a host: {endpoint}"
        )));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Decode a JSON response into `T`, mapping non-success statuses to errors.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: Response,
) -> Result<T, AppwriteError> {
    let status = response.status();
    let body = response.text().await.map_err(AppwriteError::from_reqwest)?;

    if !status.is_success() {
        return Err(AppwriteError::from_body(status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|err| AppwriteError::Decode(err.to_string()))
}

/// Accept any success status and discard the body.
pub(crate) async fn expect_empty(response: Response) -> Result<(), AppwriteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppwriteError::from_body(status.as_u16(), &body))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{Appwrite, AppwriteConfig};
    use secrecy::SecretString;

    pub const PROJECT: &str = "zamcare-test";
    pub const API_KEY: &str = "server-key";

    #[allow(clippy::unwrap_used)]
    pub fn client(uri: &str) -> Appwrite {
        let config = AppwriteConfig::new(
            format!("{uri}/v1"),
            PROJECT.to_string(),
            SecretString::from(API_KEY.to_string()),
        )
        .with_timeout_seconds(2);
        Appwrite::new(config).unwrap()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn normalize_endpoint_trims_trailing_slash() {
        assert_eq!(
            normalize_endpoint("https://cloud.appwrite.io/v1/").unwrap(),
            "https://cloud.appwrite.io/v1"
        );
    }

    #[test]
    fn normalize_endpoint_rejects_other_schemes() {
        assert!(normalize_endpoint("ftp://cloud.appwrite.io/v1").is_err());
        assert!(normalize_endpoint("not a url").is_err());
    }

    #[test]
    fn new_rejects_empty_project() {
        let config = AppwriteConfig::new(
            "https://cloud.appwrite.io/v1".to_string(),
            " ".to_string(),
            SecretString::from("key".to_string()),
        );
        assert!(Appwrite::new(config).is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = test_support::client("http://localhost:9999");
        let debug = format!("{client:?}");
        assert!(!debug.contains(test_support::API_KEY));
        assert!(debug.contains("***"));
    }

    #[test]
    fn unique_id_is_lowercase_ulid() {
        let id = unique_id();
        assert_eq!(id.len(), 26);
        assert_eq!(id, id.to_lowercase());
        assert_ne!(id, unique_id());
    }

    #[tokio::test]
    async fn ping_sends_project_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/health/version"))
            .and(header("X-Appwrite-Project", test_support::PROJECT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "version": "1.6.0"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_support::client(&server.uri());
        assert!(client.ping().await.is_ok());
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/health/version"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = test_support::client(&server.uri());
        let result = client.ping().await;
        assert!(matches!(result, Err(AppwriteError::Timeout)));
    }
}
