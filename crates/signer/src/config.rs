//! Credential, profile and per-service settings consumed by [`ApiClient`](crate::ApiClient).
//!
//! Profiles derive `Deserialize` so they can be loaded from any serde source.

use std::fmt;
use std::time::Duration;

use http::Method;
use serde::{Deserialize, Deserializer};

use crate::encoding::ContentType;
use crate::error::{ClientError, Result};
use crate::signing::SignatureMethod;

pub const SECRET_ID_ENV: &str = "TENCENTCLOUD_SECRET_ID";
pub const SECRET_KEY_ENV: &str = "TENCENTCLOUD_SECRET_KEY";
pub const SESSION_TOKEN_ENV: &str = "TENCENTCLOUD_SESSION_TOKEN";

/// API key pair plus an optional temporary session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub secret_id: String,
    pub secret_key: String,
    pub token: Option<String>,
}

impl Credential {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    /// Reads the credential from the standard environment variables.
    ///
    /// Returns `None` if the id or key is not set.
    pub fn from_env() -> Option<Self> {
        let secret_id = std::env::var(SECRET_ID_ENV).ok()?;
        let secret_key = std::env::var(SECRET_KEY_ENV).ok()?;
        let credential = Self::new(secret_id, secret_key);
        Some(match std::env::var(SESSION_TOKEN_ENV) {
            Ok(token) => credential.with_token(token),
            Err(_) => credential,
        })
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.secret_id.is_empty() {
            return Err(ClientError::InvalidCredential("secret id is empty".into()));
        }
        if self.secret_key.is_empty() {
            return Err(ClientError::InvalidCredential("secret key is empty".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"** redacted **")
            .field("token", &self.token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

/// Transport-level settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpProfile {
    #[serde(deserialize_with = "deserialize_method")]
    pub method: Method,
    /// Overrides the service's default endpoint when set.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub scheme: String,
}

impl Default for HttpProfile {
    fn default() -> Self {
        Self {
            method: Method::POST,
            endpoint: None,
            timeout_secs: 60,
            scheme: "https".to_string(),
        }
    }
}

impl HttpProfile {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn deserialize_method<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).map_err(serde::de::Error::custom)
}

/// Per-client settings: transport profile plus signing choices.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientProfile {
    pub http: HttpProfile,
    pub sign_method: SignatureMethod,
    /// Sign a fixed sentinel instead of the request body.
    pub unsigned_payload: bool,
}

impl ClientProfile {
    /// Sets the signing method from its wire name, e.g. `"HmacSHA256"`.
    pub fn with_sign_method(mut self, method: &str) -> Result<Self> {
        self.sign_method = method.parse()?;
        Ok(self)
    }

    pub fn with_http_method(mut self, method: Method) -> Self {
        self.http.method = method;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.http.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_unsigned_payload(mut self, unsigned: bool) -> Self {
        self.unsigned_payload = unsigned;
        self
    }
}

/// Constants a generated service client provides.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// Default endpoint, e.g. `cvm.tencentcloudapi.com`.
    pub endpoint: String,
    pub api_version: String,
    pub request_path: String,
    /// Body encoding the service expects for non-GET requests.
    pub content_type: ContentType,
}

impl ServiceDescriptor {
    pub fn new(endpoint: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_version: api_version.into(),
            request_path: "/".to_string(),
            content_type: ContentType::FormUrlEncoded,
        }
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }
}
