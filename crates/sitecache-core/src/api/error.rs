use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API key missing or rejected by the REST endpoint")]
    Unauthorized,

    #[error("Row-level security denied the read: {0}")]
    Forbidden(String),

    #[error("Table is not exposed by the REST endpoint: {0}")]
    MissingTable(String),

    #[error("Still rate limited after {0} retries")]
    RateLimited(u32),

    #[error("REST endpoint failed: {0}")]
    Upstream(String),

    #[error("Could not reach the REST endpoint: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {detail}")]
    UnexpectedStatus { status: u16, detail: String },
}

/// Maximum length of a raw body quoted in an error message.
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body PostgREST sends with non-2xx responses.
#[derive(Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    message: String,
    #[serde(default)]
    hint: Option<String>,
}

impl ApiError {
    /// Readable detail for an error body: PostgREST's `message` (with code
    /// and hint) when the body is its JSON error, else the raw text, cut short.
    fn describe_body(body: &str) -> String {
        if let Ok(err) = serde_json::from_str::<PostgrestError>(body) {
            let mut detail = match err.code {
                Some(code) => format!("{} ({})", err.message, code),
                None => err.message,
            };
            if let Some(hint) = err.hint.filter(|h| !h.is_empty()) {
                detail.push_str("; hint: ");
                detail.push_str(&hint);
            }
            return detail;
        }

        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... ({} bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = Self::describe_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(detail),
            404 => ApiError::MissingTable(detail),
            500..=599 => ApiError::Upstream(detail),
            code => ApiError::UnexpectedStatus { status: code, detail },
        }
    }
}
