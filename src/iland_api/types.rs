use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// iland SDK error type
///
/// Every public operation returns this error. Authentication problems,
/// server-reported failures and contract mismatches are kept apart so
/// callers can react to each differently.
#[derive(Debug)]
pub enum IlandError {
    /// Token acquisition or renewal failed
    Auth(AuthError),
    /// API request failed (network, HTTP, or response parsing error)
    Api(ApiError),
    /// Configuration error
    Config(String),
    /// A resource record outlived the client that fetched it
    SessionClosed,
    /// Lookup by identifier found nothing
    NotFound(String),
    /// Caller supplied input the API would reject
    InvalidInput(String),
    /// A polling loop exceeded its configured deadline
    Timeout(Duration),
}

impl fmt::Display for IlandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IlandError::Auth(err) => write!(f, "Authentication error: {}", err),
            IlandError::Api(err) => write!(f, "API error: {}", err),
            IlandError::Config(msg) => write!(f, "Configuration error: {}", msg),
            IlandError::SessionClosed => {
                write!(f, "Session closed: the client that fetched this resource was dropped")
            }
            IlandError::NotFound(msg) => write!(f, "Not found: {}", msg),
            IlandError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            IlandError::Timeout(after) => write!(f, "Timed out after {:?}", after),
        }
    }
}

impl std::error::Error for IlandError {}

impl From<ApiError> for IlandError {
    fn from(err: ApiError) -> Self {
        IlandError::Api(err)
    }
}

impl From<AuthError> for IlandError {
    fn from(err: AuthError) -> Self {
        IlandError::Auth(err)
    }
}

impl IlandError {
    /// HTTP status of a server-reported failure, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            IlandError::Api(ApiError::Http { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// Token lifecycle errors
#[derive(Debug)]
pub enum AuthError {
    /// The first password-grant exchange failed
    InitialAuthFailed(String),
    /// Refresh failed and the password-grant fallback failed too
    RefreshFailed(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InitialAuthFailed(msg) => {
                write!(f, "Error retrieving iland cloud API token: {}", msg)
            }
            AuthError::RefreshFailed(msg) => {
                write!(f, "Error refreshing iland cloud API token: {}", msg)
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-specific errors
#[derive(Debug)]
pub enum ApiError {
    /// Network error (connection, timeout, etc.)
    Network(String),
    /// Non-success status, with the message resolved from the error envelope
    Http {
        status: u16,
        code: Option<String>,
        message: String,
        /// Normalized response body, kept for diagnostics
        body: String,
    },
    /// Failed to parse response
    Parse(String),
    /// Request building failed
    Request(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Http { status, message, .. } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            ApiError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ApiError::Request(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timeout".to_string())
        } else if err.is_connect() {
            ApiError::Network(format!("Connection failed: {}", err))
        } else if err.is_builder() {
            ApiError::Request(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Error envelope returned by the API on non-success responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail_message: Option<String>,
}

impl ApiErrorResponse {
    /// Text to surface to users. `detail_message` wins when present.
    pub fn user_message(&self) -> String {
        self.detail_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.message.as_deref().filter(|m| !m.is_empty()))
            .or(self.error.as_deref())
            .unwrap_or("Unknown error")
            .to_string()
    }
}

/// Token endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    /// Lifetime in seconds from issue
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_message_takes_precedence() {
        let body = r#"{"error":"bad_request","message":"short","detail_message":"the long story"}"#;
        let err: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(err.user_message(), "the long story");
    }

    #[test]
    fn test_message_used_without_detail() {
        let body = r#"{"error":"not_found","message":"User not found"}"#;
        let err: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(err.user_message(), "User not found");
    }

    #[test]
    fn test_empty_detail_falls_back_to_message() {
        let err = ApiErrorResponse {
            error: Some("conflict".to_string()),
            message: Some("busy".to_string()),
            detail_message: Some(String::new()),
        };
        assert_eq!(err.user_message(), "busy");
    }

    #[test]
    fn test_token_without_refresh_token() {
        let token: Token =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":300}"#).unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, 300);
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = IlandError::Api(ApiError::Http {
            status: 404,
            code: Some("not_found".to_string()),
            message: "VM not found".to_string(),
            body: String::new(),
        });
        assert_eq!(err.to_string(), "API error: HTTP 404 error: VM not found");
        assert_eq!(err.status(), Some(404));

        let auth = IlandError::from(AuthError::InitialAuthFailed("HTTP 401".to_string()));
        assert!(auth.to_string().contains("retrieving"));
        assert_eq!(auth.status(), None);
    }
}
