//! Session lookup and the authenticated principal.

use axum::http::HeaderMap;
use tracing::debug;

use super::session::extract_session_token;
use crate::api::state::AppState;

/// Identity of a live session, available to every gated view.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: String,
    pub email: String,
    pub name: String,
}

/// Ask the backend whether the request carries a live session.
///
/// Any failure, including a missing credential, counts as "no session".
pub async fn lookup_session(headers: &HeaderMap, state: &AppState) -> Option<Principal> {
    let token = extract_session_token(headers)?;
    match state.appwrite().account().get(&token).await {
        Ok(account) => Some(Principal {
            user_id: account.id,
            email: account.email,
            name: account.name,
        }),
        Err(err) => {
            debug!("Session lookup failed: {err}");
            None
        }
    }
}
