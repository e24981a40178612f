use std::time::Duration;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid credential, signing method, content type or endpoint.
    /// Always raised before any network I/O.
    Configuration,
    /// The parameter tree could not be flattened or serialized.
    Canonicalization,
    /// Transport failure, timeout or non-200 response.
    Network,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Credential is missing or invalid: {0}")]
    InvalidCredential(String),
    #[error("Unsupported signature method: {0}")]
    UnsupportedSignatureMethod(String),
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid request parameters: {0}")]
    ClientParams(String),
    #[error("Failed to reach server: {0}")]
    Network(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Server returned HTTP {status}: {}", String::from_utf8_lossy(.body))]
    ServerStatus { status: u16, body: Vec<u8> },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::InvalidCredential(_)
            | ClientError::UnsupportedSignatureMethod(_)
            | ClientError::UnsupportedContentType(_)
            | ClientError::InvalidEndpoint(_)
            | ClientError::InvalidRequest(_) => ErrorKind::Configuration,
            ClientError::ClientParams(_) => ErrorKind::Canonicalization,
            ClientError::Network(_)
            | ClientError::Timeout(_)
            | ClientError::ServerStatus { .. } => ErrorKind::Network,
        }
    }

    /// Error code string as reported by the other cloud SDKs.
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::InvalidCredential(_) => "InvalidCredential",
            ClientError::ClientParams(_) => "ClientParamsError",
            ClientError::Network(_) | ClientError::Timeout(_) | ClientError::ServerStatus { .. } => {
                "ServerNetworkError"
            }
            _ => "ClientError",
        }
    }

    /// Raw response body for server status errors.
    pub fn response_body(&self) -> Option<&[u8]> {
        match self {
            ClientError::ServerStatus { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        Self::ClientParams(error.to_string())
    }
}
