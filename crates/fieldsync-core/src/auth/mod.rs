//! Server authentication: credentials and the user service boundary.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::payload::User;

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Longest excerpt of a non-JSON error body kept in messages.
const ERROR_EXCERPT_CHARS: usize = 180;

/// Fields requested from `/api/me`.
pub const USER_FIELDS: &str = "id,code,name,displayName,created,lastUpdated,birthday,\
education,gender,jobTitle,surname,firstName,introduction,employer,interests,languages,\
email,phoneNumber,nationality,\
userCredentials[id,code,name,displayName,created,lastUpdated,username,\
userRoles[id,code,name,displayName,created,lastUpdated]],\
organisationUnits[id]";

/// Username and password of the account being signed in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into().trim().to_string();
        if username.is_empty() {
            return Err(Error::InvalidInput("username is required".to_string()));
        }
        let password = password.into();
        if password.is_empty() {
            return Err(Error::InvalidInput("password is required".to_string()));
        }
        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Base64 of `username:password`, as stored in `authenticated_users`.
    pub fn encoded(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.username, self.password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Outcome of an authentication attempt that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Authentication {
    Authenticated(User),
    /// The server refused the credentials
    Rejected { status: u16, message: String },
}

impl Authentication {
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Rejected { .. } => None,
        }
    }
}

/// Remote user endpoint.
pub trait UserService: Send + Sync {
    fn authenticate(&self, credentials: &Credentials) -> Result<Authentication>;
}

/// `UserService` backed by the server's `/api/me` endpoint.
#[derive(Debug, Clone)]
pub struct HttpUserService {
    base_url: String,
    client: Client,
}

impl HttpUserService {
    pub fn new(server_url: &str) -> Result<Self> {
        let base_url = normalize_server_url(server_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl UserService for HttpUserService {
    fn authenticate(&self, credentials: &Credentials) -> Result<Authentication> {
        tracing::debug!("Authenticating {} against {}", credentials.username(), self.base_url);
        let response = self
            .client
            .get(format!("{}/api/me", self.base_url))
            .query(&[("fields", USER_FIELDS)])
            .header(reqwest::header::ACCEPT, "application/json")
            .basic_auth(credentials.username(), Some(credentials.password()))
            .send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(Authentication::Authenticated(response.json::<User>()?));
        }

        let body = response.text().unwrap_or_default();
        let message = parse_api_error(status, &body);
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            Ok(Authentication::Rejected {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(Error::Transport(message))
        }
    }
}

/// Trim a server URL and check it is an absolute http(s) URL; the trailing `/` is dropped.
pub fn normalize_server_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("server URL must not be empty".to_string()));
    }
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|error| Error::Config(format!("invalid server URL '{trimmed}': {error}")))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(Error::Config(
            "server URL must include http:// or https://".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    message: Option<String>,
    error: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|payload| payload.message.or(payload.error))
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty());
    if let Some(message) = message {
        return format!("{message} ({})", status.as_u16());
    }

    let excerpt: String = body.trim().chars().take(ERROR_EXCERPT_CHARS).collect();
    if excerpt.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{excerpt} ({})", status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_encode_as_basic_auth_pair() {
        let credentials = Credentials::new("admin", "district").unwrap();
        assert_eq!(credentials.encoded(), "YWRtaW46ZGlzdHJpY3Q=");
    }

    #[test]
    fn credentials_require_both_parts() {
        assert!(matches!(
            Credentials::new("  ", "district"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            Credentials::new("admin", ""),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("admin", "district").unwrap());
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("district"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn server_url_is_normalized() {
        assert_eq!(
            normalize_server_url(" https://play.dhis2.org/demo/ ").unwrap(),
            "https://play.dhis2.org/demo"
        );
        assert!(matches!(
            normalize_server_url("play.dhis2.org"),
            Err(Error::Config(_))
        ));
        assert!(matches!(normalize_server_url(""), Err(Error::Config(_))));
        assert!(matches!(
            normalize_server_url("ftp://play.dhis2.org"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn api_error_prefers_server_message() {
        let body = r#"{"httpStatus":"Unauthorized","httpStatusCode":401,"message":"Bad credentials"}"#;
        assert_eq!(
            parse_api_error(StatusCode::UNAUTHORIZED, body),
            "Bad credentials (401)"
        );
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
        assert_eq!(
            parse_api_error(StatusCode::INTERNAL_SERVER_ERROR, " upstream down "),
            "upstream down (500)"
        );
        let long = parse_api_error(StatusCode::BAD_GATEWAY, &"x".repeat(500));
        assert_eq!(long, format!("{} (502)", "x".repeat(ERROR_EXCERPT_CHARS)));
    }
}
