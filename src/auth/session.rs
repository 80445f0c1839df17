//! Session management for the Nest web API.
//!
//! The vendor exposes no public credential issuance, so authentication
//! starts from a browser-captured OAuth cookie (see the README) and runs a
//! two-step exchange: the cookie buys a short-lived Google access token,
//! which in turn buys the Nest JWT that authorizes device calls.
//!
//! `SessionManager` owns the cached session and refreshes it lazily. The
//! refresh is single-flight: the token state lives behind an async mutex
//! that is held across the exchange, so concurrent callers await one
//! in-flight authentication instead of racing their own.

use chrono::{DateTime, Duration, Utc};
use reqwest::{header, Client};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::api::client::{JWT_URL, NEST_API_KEY, NEST_URL, OAUTH_URL};
use crate::api::{check_response, parse_json, ApiError};
use crate::config::OauthSection;

/// OAuth scope requested for the access token
const OAUTH_SCOPE: &str = "openid profile email https://www.googleapis.com/auth/nest-account";

/// Requested JWT lifetime
const JWT_EXPIRE_AFTER: &str = "3600s";

/// Refresh this long before the nominal expiry, so a token never goes
/// stale mid-request
const EXPIRY_BUFFER_SECS: i64 = 60;

/// An authenticated session: the JWT that authorizes device calls, the
/// vendor user id embedded in its claims, and its expiry.
#[derive(Debug, Clone)]
pub struct Session {
    pub jwt: String,
    pub user_id: String,
    pub expiry: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_BUFFER_SECS) >= self.expiry
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expiry - Utc::now()
    }
}

/// Endpoints used by the token exchange. Defaults point at the real
/// services; tests substitute a local stub.
#[derive(Debug, Clone)]
pub struct AuthUrls {
    pub oauth_url: String,
    pub jwt_url: String,
    /// Origin/ss_domain sent to the token issuance endpoint
    pub origin: String,
}

impl Default for AuthUrls {
    fn default() -> Self {
        Self {
            oauth_url: OAUTH_URL.to_string(),
            jwt_url: JWT_URL.to_string(),
            origin: NEST_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IssueTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwtResponse {
    jwt: String,
    claims: JwtClaims,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    #[serde(rename = "expirationTime")]
    expiration_time: String,
    subject: JwtSubject,
}

#[derive(Debug, Deserialize)]
struct JwtSubject {
    #[serde(rename = "nestId")]
    nest_id: NestId,
}

#[derive(Debug, Deserialize)]
struct NestId {
    id: String,
}

/// Owns the cached session token and the credentials needed to replace it.
pub struct SessionManager {
    client: Client,
    oauth: OauthSection,
    urls: AuthUrls,
    state: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(client: Client, oauth: OauthSection, urls: AuthUrls) -> Self {
        Self {
            client,
            oauth,
            urls,
            state: Mutex::new(None),
        }
    }

    /// Return the cached session if unexpired, authenticating otherwise.
    ///
    /// Holding the state lock across the exchange is what makes refresh
    /// single-flight: callers that arrive during an in-flight
    /// authentication block here and then find a fresh token.
    pub async fn ensure_valid(&self) -> Result<Session, ApiError> {
        let mut state = self.state.lock().await;
        if let Some(session) = state.as_ref() {
            if !session.is_expired() {
                return Ok(session.clone());
            }
            debug!(user_id = %session.user_id, "Session expired, re-authenticating");
        }
        match self.authenticate().await {
            Ok(session) => {
                *state = Some(session.clone());
                Ok(session)
            }
            Err(err) => {
                // Never leave a stale token behind a failed refresh
                *state = None;
                Err(err)
            }
        }
    }

    /// Run the full cookie -> access token -> JWT exchange. Does not touch
    /// the cached state; use `ensure_valid` for normal operation.
    pub async fn authenticate(&self) -> Result<Session, ApiError> {
        let access_token = self.fetch_access_token().await?;
        let session = self.issue_jwt(&access_token).await?;
        debug!(
            user_id = %session.user_id,
            expiry = %session.expiry,
            "Authenticated"
        );
        Ok(session)
    }

    /// Exchange the browser cookie for a Google access token
    async fn fetch_access_token(&self) -> Result<String, ApiError> {
        let response = self
            .client
            .get(&self.urls.oauth_url)
            .query(&[
                ("action", "issueToken"),
                ("response_type", "token id_token"),
                ("login_hint", self.oauth.login_hint.as_str()),
                ("client_id", self.oauth.client_id.as_str()),
                ("origin", self.urls.origin.as_str()),
                ("scope", OAUTH_SCOPE),
                ("ss_domain", self.urls.origin.as_str()),
            ])
            .header(header::COOKIE, self.oauth.cookie.as_str())
            .header(header::REFERER, "https://accounts.google.com/o/oauth2/iframe")
            .header("X-Requested-With", "XmlHttpRequest")
            .header("Sec-Fetch-Mode", "cors")
            .send()
            .await?;

        let response = check_response(response).await?;
        let parsed: IssueTokenResponse = parse_json(response).await?;

        match parsed.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => {
                // The endpoint answers 200 with an error payload when the
                // cookie is no longer valid
                let detail = parsed
                    .error
                    .unwrap_or_else(|| "token issuance response had no access_token".to_string());
                Err(ApiError::Authentication(detail))
            }
        }
    }

    /// Exchange the access token for the Nest JWT that device calls use
    async fn issue_jwt(&self, access_token: &str) -> Result<Session, ApiError> {
        let response = self
            .client
            .post(&self.urls.jwt_url)
            .query(&[
                ("embed_google_oauth_access_token", "true"),
                ("expire_after", JWT_EXPIRE_AFTER),
                ("google_oauth_access_token", access_token),
                ("policy_id", "authproxy-oauth-policy"),
            ])
            .bearer_auth(access_token)
            .header("x-goog-api-key", NEST_API_KEY)
            .send()
            .await?;

        let response = check_response(response).await?;
        let parsed: JwtResponse = parse_json(response).await?;

        let expiry = DateTime::parse_from_rfc3339(&parsed.claims.expiration_time)
            .map_err(|err| {
                ApiError::UnexpectedResponse(format!(
                    "could not parse claims.expirationTime {:?}: {}",
                    parsed.claims.expiration_time, err
                ))
            })?
            .with_timezone(&Utc);

        Ok(Session {
            jwt: parsed.jwt,
            user_id: parsed.claims.subject.nest_id.id,
            expiry,
        })
    }

    /// Seed the cached session, for callers that obtained one elsewhere
    #[cfg(test)]
    pub(crate) async fn set_session(&self, session: Session) {
        *self.state.lock().await = Some(session);
    }
}
