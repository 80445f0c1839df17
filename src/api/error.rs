use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The vendor rejected our credentials. The cookie in the config is
    /// malformed or expired; the only recovery is to repeat the manual
    /// browser capture procedure (see the README) and update the config.
    #[error("Authentication failed: {0} - capture a fresh [oauth] cookie in your browser and update the config")]
    Authentication(String),

    #[error("Invalid value: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response did not match the expected shape. The API is
    /// undocumented and the vendor can change it without notice.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid logging excessive data
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..MAX_ERROR_BODY_LENGTH],
            body.len()
        )
    }
}

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = truncate_body(body);
        match status.as_u16() {
            401 | 403 => ApiError::Authentication(format!("rejected with status {}", status)),
            404 => ApiError::NotFound(truncated),
            _ => ApiError::UnexpectedResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}
