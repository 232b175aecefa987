//! Client configuration and credentials.

use secrecy::SecretString;
use std::time::Duration;

use crate::iland_api::types::IlandError;

/// Default iland cloud API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.ilandcloud.com/ecs";

/// Default OpenID Connect token endpoint (serves both grants)
pub const DEFAULT_TOKEN_URL: &str =
    "https://console.ilandcloud.com/auth/realms/iland-core/protocol/openid-connect/token";

/// Versioned media type sent as `Accept` and `Content-Type`
pub const DEFAULT_MEDIA_TYPE: &str = "application/vnd.ilandcloud.api.v0.8+json";

/// Account credentials, immutable once the client is built.
#[derive(Debug)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Read credentials from environment variables.
    ///
    /// Environment variables (all required):
    /// - `ILAND_CLIENT_ID`
    /// - `ILAND_CLIENT_SECRET`
    /// - `ILAND_USERNAME`
    /// - `ILAND_PASSWORD`
    pub fn from_env() -> Result<Self, IlandError> {
        Ok(Self::new(
            required_var("ILAND_CLIENT_ID")?,
            required_var("ILAND_CLIENT_SECRET")?,
            required_var("ILAND_USERNAME")?,
            required_var("ILAND_PASSWORD")?,
        ))
    }
}

/// Configuration for the `IlandClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every relative resource path is appended to.
    pub api_base_url: String,
    /// Password-grant endpoint.
    pub token_url: String,
    /// Refresh-grant endpoint.
    pub refresh_url: String,
    /// Media type for `Accept` and `Content-Type`.
    pub media_type: String,
    /// Subtracted from `expires_in` so a token never lapses mid-request.
    pub token_safety_margin: Duration,
    /// Connection timeout. `None` leaves the transport default (no limit).
    pub connect_timeout: Option<Duration>,
    /// Whole-request timeout. `None` leaves the transport default (no limit).
    pub request_timeout: Option<Duration>,
    /// Sleep between task polls in `Task::track`.
    pub task_poll_interval: Duration,
    /// Sleep between active-task checks before mutating an entity.
    pub readiness_poll_interval: Duration,
    /// Upper bound on any polling loop. `None` polls forever.
    pub poll_timeout: Option<Duration>,
    /// Log and swallow errors on collection reads, returning an empty list.
    pub lenient_collections: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            refresh_url: DEFAULT_TOKEN_URL.to_string(),
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
            token_safety_margin: Duration::from_secs(10),
            connect_timeout: None,
            request_timeout: None,
            task_poll_interval: Duration::from_secs(10),
            readiness_poll_interval: Duration::from_secs(5),
            poll_timeout: None,
            lenient_collections: false,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Every variable is optional; unset ones keep their default.
    /// - `ILAND_API_BASE_URL`
    /// - `ILAND_TOKEN_URL`
    /// - `ILAND_REFRESH_URL` (defaults to the token URL)
    /// - `ILAND_MEDIA_TYPE`
    /// - `ILAND_CONNECT_TIMEOUT_MS`
    /// - `ILAND_REQUEST_TIMEOUT_MS`
    /// - `ILAND_TASK_POLL_INTERVAL_MS`
    /// - `ILAND_READINESS_POLL_INTERVAL_MS`
    /// - `ILAND_POLL_TIMEOUT_MS`
    /// - `ILAND_LENIENT_COLLECTIONS` ("true"/"1" or "false"/"0", any case)
    pub fn from_env() -> Result<Self, IlandError> {
        let defaults = Self::default();

        let api_base_url =
            std::env::var("ILAND_API_BASE_URL").unwrap_or(defaults.api_base_url);
        let token_url = std::env::var("ILAND_TOKEN_URL").unwrap_or(defaults.token_url);
        let refresh_url = std::env::var("ILAND_REFRESH_URL").unwrap_or_else(|_| token_url.clone());
        let media_type = std::env::var("ILAND_MEDIA_TYPE").unwrap_or(defaults.media_type);

        let lenient_collections =
            flag_var("ILAND_LENIENT_COLLECTIONS")?.unwrap_or(defaults.lenient_collections);

        Ok(Self {
            api_base_url,
            token_url,
            refresh_url,
            media_type,
            token_safety_margin: defaults.token_safety_margin,
            connect_timeout: millis_var("ILAND_CONNECT_TIMEOUT_MS")?,
            request_timeout: millis_var("ILAND_REQUEST_TIMEOUT_MS")?,
            task_poll_interval: millis_var("ILAND_TASK_POLL_INTERVAL_MS")?
                .unwrap_or(defaults.task_poll_interval),
            readiness_poll_interval: millis_var("ILAND_READINESS_POLL_INTERVAL_MS")?
                .unwrap_or(defaults.readiness_poll_interval),
            poll_timeout: millis_var("ILAND_POLL_TIMEOUT_MS")?,
            lenient_collections,
        })
    }

    /// Set the API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Point both token grants at the same endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.refresh_url = url.clone();
        self.token_url = url;
        self
    }

    /// Use a separate endpoint for the refresh grant.
    pub fn with_refresh_url(mut self, url: impl Into<String>) -> Self {
        self.refresh_url = url.into();
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    pub fn with_token_safety_margin(mut self, margin: Duration) -> Self {
        self.token_safety_margin = margin;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_task_poll_interval(mut self, interval: Duration) -> Self {
        self.task_poll_interval = interval;
        self
    }

    pub fn with_readiness_poll_interval(mut self, interval: Duration) -> Self {
        self.readiness_poll_interval = interval;
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = Some(timeout);
        self
    }

    pub fn with_lenient_collections(mut self, lenient: bool) -> Self {
        self.lenient_collections = lenient;
        self
    }
}

fn required_var(name: &str) -> Result<String, IlandError> {
    std::env::var(name).map_err(|_| IlandError::Config(format!("{} is not set", name)))
}

fn millis_var(name: &str) -> Result<Option<Duration>, IlandError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|e| IlandError::Config(format!("invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

fn flag_var(name: &str) -> Result<Option<bool>, IlandError> {
    match std::env::var(name) {
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(IlandError::Config(format!(
                "invalid {}: expected true, false, 1 or 0, got {:?}",
                name, value
            ))),
        },
        Err(_) => Ok(None),
    }
}
