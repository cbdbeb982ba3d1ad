//! Session cookie handling and the session check endpoint.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use tracing::debug;

use super::{principal::lookup_session, types::SessionResponse};
use crate::api::{state::WebConfig, SharedState};

pub const SESSION_COOKIE_NAME: &str = "zamcare_session";

#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, state: Extension<SharedState>) -> impl IntoResponse {
    // Missing or dead sessions are reported the same way.
    match lookup_session(&headers, &state).await {
        Some(principal) => (
            StatusCode::OK,
            Json(SessionResponse {
                user_id: principal.user_id,
                email: principal.email,
                name: principal.name,
            }),
        )
            .into_response(),
        None => {
            debug!("No active session");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

/// Build an `HttpOnly` cookie carrying the backend session secret.
pub(crate) fn session_cookie(
    config: &WebConfig,
    secret: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={secret}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn clear_session_cookie(config: &WebConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Value of a named cookie from the request headers.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next()?.trim();
            let val = parts.next()?.trim();
            (key == name).then(|| val.to_string())
        })
}

/// Session secret from a bearer token or the session cookie.
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    cookie_value(headers, SESSION_COOKIE_NAME).filter(|token| !token.is_empty())
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(*name, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn extracts_session_from_cookie() {
        let headers = headers(&[(
            "cookie",
            "theme=dark; zamcare_session=abc123; userRole=donor",
        )]);
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn bearer_token_wins_over_cookie() {
        let headers = headers(&[
            ("authorization", "Bearer tok"),
            ("cookie", "zamcare_session=abc123"),
        ]);
        assert_eq!(extract_session_token(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn empty_cookie_is_no_session() {
        let headers = headers(&[("cookie", "zamcare_session=")]);
        assert!(extract_session_token(&headers).is_none());
        assert!(extract_session_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn session_cookie_attributes() {
        let config = WebConfig::new("https://zamcare.org".to_string()).with_session_ttl_seconds(60);
        let cookie = session_cookie(&config, "s3cret").unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("zamcare_session=s3cret;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=60"));
        assert!(cookie.ends_with("; Secure"));

        let cleared = clear_session_cookie(&config).unwrap();
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }
}
