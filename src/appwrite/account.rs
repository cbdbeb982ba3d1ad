use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use super::{decode_json, expect_empty, Account, Appwrite, AppwriteError, Auth, Session};

/// Account and session endpoints.
#[derive(Clone, Copy, Debug)]
pub struct AccountApi<'a> {
    client: &'a Appwrite,
}

impl<'a> AccountApi<'a> {
    pub(crate) fn new(client: &'a Appwrite) -> Self {
        Self { client }
    }

    /// Current account for a session secret. Used to check for a live session.
    ///
    /// # Errors
    /// Returns an HTTP 401 error when the session is missing or expired.
    #[instrument(skip_all)]
    pub async fn get(&self, session: &str) -> Result<Account, AppwriteError> {
        let response = self
            .client
            .request(Method::GET, "/account", Auth::Session(session))
            .send()
            .await
            .map_err(AppwriteError::from_reqwest)?;
        decode_json(response).await
    }

    /// Register a new email/password account.
    ///
    /// # Errors
    /// Returns an error if the backend rejects the account (e.g. 409 on a
    /// duplicate email).
    #[instrument(skip(self, password))]
    pub async fn create(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account, AppwriteError> {
        let response = self
            .client
            .request(Method::POST, "/account", Auth::Guest)
            .json(&json!({
                "userId": user_id,
                "email": email,
                "password": password,
                "name": name,
            }))
            .send()
            .await
            .map_err(AppwriteError::from_reqwest)?;
        decode_json(response).await
    }

    /// Create an email/password session. Sent with the server key so the
    /// response carries the session secret.
    ///
    /// # Errors
    /// Returns an HTTP 401 error on invalid credentials.
    #[instrument(skip(self, password))]
    pub async fn create_email_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AppwriteError> {
        let response = self
            .client
            .request(Method::POST, "/account/sessions/email", Auth::Key)
            .json(&json!({"email": email, "password": password}))
            .send()
            .await
            .map_err(AppwriteError::from_reqwest)?;
        let session: Session = decode_json(response).await?;
        if session.secret.is_empty() {
            return Err(AppwriteError::Decode(
                "session response did not include a secret".to_string(),
            ));
        }
        Ok(session)
    }

    /// # Errors
    /// Returns an error if the backend refuses to delete the session.
    #[instrument(skip_all)]
    pub async fn delete_session(&self, session: &str) -> Result<(), AppwriteError> {
        let response = self
            .client
            .request(
                Method::DELETE,
                "/account/sessions/current",
                Auth::Session(session),
            )
            .send()
            .await
            .map_err(AppwriteError::from_reqwest)?;
        expect_empty(response).await
    }

    /// Ask the backend to mail a password recovery link pointing at `url`.
    ///
    /// # Errors
    /// Returns an error if the backend rejects the request.
    #[instrument(skip(self))]
    pub async fn create_recovery(&self, email: &str, url: &str) -> Result<(), AppwriteError> {
        let response = self
            .client
            .request(Method::POST, "/account/recovery", Auth::Key)
            .json(&json!({"email": email, "url": url}))
            .send()
            .await
            .map_err(AppwriteError::from_reqwest)?;
        expect_empty(response).await
    }
}
