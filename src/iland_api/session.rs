use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use secrecy::ExposeSecret;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;

use crate::iland_api::client::IlandClient;
use crate::iland_api::config::{ClientConfig, Credentials};
use crate::iland_api::types::{ApiError, ApiErrorResponse, AuthError, IlandError, Token};

/// Marker the API prepends to every JSON body
pub const JSON_HIJACKING_PREFIX: &[u8] = b")]}'";

/// Remove the anti-hijacking marker. Bodies without it are returned as-is.
pub fn strip_json_hijacking_prefix(body: &[u8]) -> &[u8] {
    body.strip_prefix(JSON_HIJACKING_PREFIX).unwrap_or(body)
}

/// A token together with the instant it stops being usable
#[derive(Clone)]
pub(crate) struct TokenState {
    token: Token,
    expires_at: DateTime<Utc>,
}

impl TokenState {
    /// `expires_at = issued_at + expires_in - margin`
    pub(crate) fn new(token: Token, issued_at: DateTime<Utc>, margin: std::time::Duration) -> Self {
        let lifetime =
            chrono::Duration::try_seconds(token.expires_in).unwrap_or_else(chrono::Duration::zero);
        let margin = chrono::Duration::from_std(margin).unwrap_or_else(|_| chrono::Duration::zero());
        let expires_at = issued_at
            .checked_add_signed(lifetime - margin)
            .unwrap_or(issued_at);

        Self { token, expires_at }
    }

    pub(crate) fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub(crate) fn access_token(&self) -> &str {
        &self.token.access_token
    }

    pub(crate) fn refresh_token(&self) -> Option<&str> {
        self.token.refresh_token.as_deref()
    }

    pub(crate) fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenState")
            .field("expires_at", &self.expires_at)
            .field("has_refresh_token", &self.token.refresh_token.is_some())
            .finish_non_exhaustive()
    }
}

/// Session core
///
/// Owns the credentials, the HTTP transport and the single token slot.
/// The slot is only touched while its mutex is held, so concurrent callers
/// share one in-flight exchange and always read a consistent token and
/// expiration pair.
pub struct Session {
    config: ClientConfig,
    credentials: Credentials,
    http: reqwest::Client,
    token: Mutex<Option<TokenState>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("api_base_url", &self.config.api_base_url)
            .field("username", &self.credentials.username)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(credentials: Credentials, config: ClientConfig) -> Result<Self, IlandError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| IlandError::Config(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            "Creating iland session for {} against {}",
            credentials.username,
            config.api_base_url
        );

        Ok(Self {
            config,
            credentials,
            http,
            token: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// Make sure a currently-valid token is held, fetching or renewing it
    /// if needed.
    pub async fn ensure_valid_token(&self) -> Result<(), IlandError> {
        self.bearer_token().await.map(|_| ())
    }

    /// Expiration instant of the held token, `None` before the first exchange
    pub async fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.token.lock().await.as_ref().map(TokenState::expires_at)
    }

    /// Returns the access token to use for the next request. The whole
    /// check-exchange-store sequence runs under the slot lock.
    async fn bearer_token(&self) -> Result<String, IlandError> {
        let mut slot = self.token.lock().await;

        let next = match slot.as_ref() {
            Some(state) if state.is_fresh_at(Utc::now()) => {
                return Ok(state.access_token().to_string());
            }
            Some(state) => {
                let refresh_token = state.refresh_token().map(str::to_string);
                self.renew(refresh_token).await?
            }
            None => {
                tracing::debug!("Retrieving a new iland cloud API token");
                self.authenticate().await.map_err(|e| {
                    tracing::error!("Initial authentication failed: {}", e);
                    AuthError::InitialAuthFailed(e.to_string())
                })?
            }
        };

        let bearer = next.access_token().to_string();
        *slot = Some(next);
        Ok(bearer)
    }

    /// Refresh grant first, password grant as the fallback.
    async fn renew(&self, refresh_token: Option<String>) -> Result<TokenState, AuthError> {
        match refresh_token {
            Some(refresh_token) => {
                tracing::debug!("Refreshing iland cloud API token");
                let form = [
                    ("client_id", self.credentials.client_id.as_str()),
                    ("client_secret", self.credentials.client_secret.expose_secret()),
                    ("refresh_token", refresh_token.as_str()),
                    ("grant_type", "refresh_token"),
                ];
                match self.exchange(&self.config.refresh_url, &form).await {
                    Ok(state) => {
                        tracing::info!("iland cloud API token refreshed");
                        return Ok(state);
                    }
                    Err(e) => {
                        tracing::warn!("Token refresh failed, re-authenticating: {}", e);
                    }
                }
            }
            None => {
                tracing::debug!("No refresh token was issued, re-authenticating");
            }
        }

        self.authenticate().await.map_err(|e| {
            tracing::error!("Re-authentication after failed refresh failed: {}", e);
            AuthError::RefreshFailed(e.to_string())
        })
    }

    async fn authenticate(&self) -> Result<TokenState, ApiError> {
        let form = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.expose_secret()),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.expose_secret()),
            ("grant_type", "password"),
        ];
        let state = self.exchange(&self.config.token_url, &form).await?;
        tracing::info!("Authenticated with iland cloud as {}", self.credentials.username);
        Ok(state)
    }

    /// POST a form-encoded grant to a token endpoint.
    async fn exchange(&self, url: &str, form: &[(&str, &str)]) -> Result<TokenState, ApiError> {
        let issued_at = Utc::now();

        let response = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        let raw = response.bytes().await.map_err(ApiError::from)?;
        let body = strip_json_hijacking_prefix(&raw);

        if !status.is_success() {
            let text = String::from_utf8_lossy(body).into_owned();
            tracing::error!("Token exchange failed: HTTP {}", status.as_u16());
            return Err(ApiError::Http {
                status: status.as_u16(),
                code: None,
                message: "Could not retrieve a token".to_string(),
                body: text,
            });
        }

        let token: Token = serde_json::from_slice(body).map_err(|e| {
            tracing::error!("Failed to parse token response: {}", e);
            ApiError::Parse(format!("Failed to parse token response: {}", e))
        })?;

        tracing::debug!(
            "Token exchange succeeded: expires_in={}s, access token length {}",
            token.expires_in,
            token.access_token.len()
        );

        Ok(TokenState::new(token, issued_at, self.config.token_safety_margin))
    }

    /// Execute an authenticated request against `api_base_url + relative_path`
    /// and return the normalized body.
    ///
    /// Any status below 300 is success. Other statuses are decoded as an
    /// [`ApiErrorResponse`]; the request is never retried.
    pub async fn authenticated_request(
        &self,
        method: Method,
        relative_path: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, IlandError> {
        let bearer = self.bearer_token().await?;
        let url = format!("{}{}", self.config.api_base_url, relative_path);

        tracing::debug!("Sending {} request to: {}", method, url);

        let response = self
            .http
            .request(method.clone(), &url)
            .header(AUTHORIZATION, format!("Bearer {}", bearer))
            .header(ACCEPT, self.config.media_type.as_str())
            .header(CONTENT_TYPE, self.config.media_type.as_str())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send {} {}: {}", method, url, e);
                ApiError::from(e)
            })?;

        read_response(response).await
    }

    /// GET a non-JSON payload such as a ticket attachment.
    pub async fn get_binary(&self, relative_path: &str) -> Result<Vec<u8>, IlandError> {
        let bearer = self.bearer_token().await?;
        let url = format!("{}{}", self.config.api_base_url, relative_path);

        tracing::debug!("Downloading binary from: {}", url);

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", bearer))
            .header(CONTENT_TYPE, self.config.media_type.as_str())
            .send()
            .await
            .map_err(ApiError::from)?;

        read_response(response).await
    }
}

async fn read_response(response: reqwest::Response) -> Result<Vec<u8>, IlandError> {
    let status = response.status();
    tracing::debug!("Received response with status: {}", status);

    let raw = response.bytes().await.map_err(ApiError::from)?;
    let body = strip_json_hijacking_prefix(&raw).to_vec();

    if status.is_success() {
        return Ok(body);
    }

    Err(failure_from_body(status.as_u16(), body).into())
}

/// Turn a non-success body into an error, preferring `detail_message`.
pub(crate) fn failure_from_body(status: u16, body: Vec<u8>) -> ApiError {
    let text = String::from_utf8_lossy(&body).into_owned();
    match serde_json::from_slice::<ApiErrorResponse>(&body) {
        Ok(envelope) => {
            let message = envelope.user_message();
            tracing::error!("Request failed: HTTP {} - {}", status, message);
            ApiError::Http {
                status,
                code: envelope.error,
                message,
                body: text,
            }
        }
        Err(e) => {
            tracing::error!("Failed to decode API error (HTTP {}): {} - Body: {}", status, e, text);
            ApiError::Parse(format!("Failed to decode API error (HTTP {}): {}", status, e))
        }
    }
}

/// Non-owning link from a resource record back to the session that fetched it
///
/// Never serialized; records decoded by hand carry an empty link.
#[derive(Debug, Clone, Default)]
pub struct SessionLink(Weak<Session>);

impl SessionLink {
    pub(crate) fn new(session: &Arc<Session>) -> Self {
        Self(Arc::downgrade(session))
    }

    /// Client for follow-up requests, or `SessionClosed` once the client is gone
    pub fn client(&self) -> Result<IlandClient, IlandError> {
        self.0
            .upgrade()
            .map(IlandClient::from_session)
            .ok_or(IlandError::SessionClosed)
    }

    pub fn is_attached(&self) -> bool {
        self.0.strong_count() > 0
    }
}
