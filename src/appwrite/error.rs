use thiserror::Error;

/// Maximum number of error body characters kept from backend responses.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("invalid backend configuration: {0}")]
    Config(String),
    #[error("unable to reach the backend: {0}")]
    Network(#[source] reqwest::Error),
    #[error("backend request timed out")]
    Timeout,
    #[error("backend request failed ({status}): {message}")]
    Http {
        status: u16,
        kind: Option<String>,
        message: String,
    },
    #[error("unexpected backend response: {0}")]
    Decode(String),
    #[error("request cancelled")]
    Cancelled,
}

impl AppwriteError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err)
        }
    }

    /// Build an HTTP error from a non-success response body.
    ///
    /// The backend answers with `{"message", "code", "type"}`; anything else is
    /// kept as sanitized text.
    pub(crate) fn from_body(status: u16, body: &str) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|value| value["message"].as_str())
            .map_or_else(|| sanitize_body(body), sanitize_body);
        let kind = parsed
            .as_ref()
            .and_then(|value| value["type"].as_str())
            .map(ToString::to_string);

        Self::Http {
            status,
            kind,
            message,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { message, .. } => message.clone(),
            Self::Timeout => "The service did not answer in time.".to_string(),
            Self::Cancelled => "The request was cancelled.".to_string(),
            Self::Network(_) | Self::Decode(_) | Self::Config(_) => {
                "The service is unavailable.".to_string()
            }
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
