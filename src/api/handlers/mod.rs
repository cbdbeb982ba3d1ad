//! Route handlers and shared helpers.

pub mod auth;
pub mod children;
pub mod dashboards;
pub mod donations;
pub mod health;
pub mod opportunities;
pub mod photos;
pub mod profile;
pub mod requests;
pub mod root;
pub mod volunteers;

use axum::{
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use regex::Regex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::api::views::{Notice, NoticeBody};

/// Lightweight email sanity check run before anything is sent to the backend.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// `303 See Other` to `path`, carrying a notice body for clients that read it.
pub(crate) fn redirect_with_notice(path: &'static str, notice: Notice) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(LOCATION, HeaderValue::from_static(path))],
        Json(NoticeBody { notice }),
    )
        .into_response()
}

/// Milliseconds since the unix epoch; `0` if the clock is before the epoch.
pub(crate) fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_accepts_common_forms() {
        assert!(valid_email("donor@zamcare.org"));
        assert!(valid_email("first.last+tag@mail.example.co.zm"));
    }

    #[test]
    fn valid_email_rejects_malformed() {
        assert!(!valid_email("donor"));
        assert!(!valid_email("donor@zamcare"));
        assert!(!valid_email("do nor@zamcare.org"));
        assert!(!valid_email(""));
    }

    #[test]
    fn redirect_with_notice_sets_location() {
        let response = redirect_with_notice("/login", Notice::success("ok"));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/login")
        );
    }

    #[test]
    fn unix_millis_is_after_2020() {
        assert!(unix_millis() > 1_577_836_800_000);
    }
}
