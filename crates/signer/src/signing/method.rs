use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ClientError;

/// Signing protocol selected by the client profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum SignatureMethod {
    /// Legacy query-string signature over HMAC-SHA1.
    HmacSha1,
    /// Legacy query-string signature over HMAC-SHA256.
    HmacSha256,
    /// Canonical-request signature with a date/service scoped key.
    #[default]
    Tc3HmacSha256,
}

impl SignatureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureMethod::HmacSha1 => "HmacSHA1",
            SignatureMethod::HmacSha256 => "HmacSHA256",
            SignatureMethod::Tc3HmacSha256 => "TC3-HMAC-SHA256",
        }
    }

    pub fn is_legacy(&self) -> bool {
        !matches!(self, SignatureMethod::Tc3HmacSha256)
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HmacSHA1" => Ok(SignatureMethod::HmacSha1),
            "HmacSHA256" => Ok(SignatureMethod::HmacSha256),
            "TC3-HMAC-SHA256" => Ok(SignatureMethod::Tc3HmacSha256),
            other => Err(ClientError::UnsupportedSignatureMethod(other.to_string())),
        }
    }
}

impl TryFrom<String> for SignatureMethod {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
