//! Client for the private Nest web API.
//!
//! The endpoints are undocumented and vendor-owned; every path and payload
//! shape lives in `client` so that vendor drift requires changes in one
//! place only. Device calls are authorized with the JWT obtained by
//! `auth::SessionManager`.

pub mod client;
pub mod error;

pub use client::NestClient;
pub use error::ApiError;

use serde::de::DeserializeOwned;

/// Check if a response is successful, mapping error statuses to the
/// `ApiError` taxonomy.
pub(crate) async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }
}

/// Parse a JSON body, distinguishing shape mismatches (API drift) from
/// transport failures.
pub(crate) async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|err| {
        ApiError::UnexpectedResponse(format!("{} in body: {}", err, error::truncate_body(&text)))
    })
}
