use std::fmt;

use chrono::DateTime;
use http::Method;
use serde_json::Value;
use tracing::trace;

use super::context::SigningContext;
use super::crypto::{TC3_REQUEST, sha256_hex, tc3_signature};
use super::signer::RequestSigner;
use crate::encoding::{ContentType, encode_form, encode_json, encode_multipart, new_boundary};
use crate::error::{ClientError, Result};
use crate::params::{flatten_value, require_mapping};
use crate::request::RequestDescriptor;

pub const TC3_ALGORITHM: &str = "TC3-HMAC-SHA256";
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
pub const SIGNED_HEADERS: &str = "content-type;host";

pub const X_TC_ACTION: &str = "x-tc-action";
pub const X_TC_REQUEST_CLIENT: &str = "x-tc-requestclient";
pub const X_TC_NONCE: &str = "x-tc-nonce";
pub const X_TC_TIMESTAMP: &str = "x-tc-timestamp";
pub const X_TC_VERSION: &str = "x-tc-version";
pub const X_TC_REGION: &str = "x-tc-region";
pub const X_TC_TOKEN: &str = "x-tc-token";
pub const X_TC_CONTENT_SHA256: &str = "x-tc-content-sha256";

/// Canonical-request signer (`TC3-HMAC-SHA256`).
///
/// Authentication material travels in `X-TC-*` headers and the
/// `Authorization` header; only `content-type` and `host` are signed.
#[derive(Debug, Clone, Default)]
pub struct Tc3Signer {
    boundary: Option<String>,
}

impl Tc3Signer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a fixed multipart boundary instead of a random one per call.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: Some(boundary.into()),
        }
    }
}

impl RequestSigner for Tc3Signer {
    fn sign(&self, ctx: &SigningContext<'_>, params: &Value, request: &mut RequestDescriptor) -> Result<()> {
        let tree = require_mapping(params)?;
        let content_type = resolve_content_type(&request.method, ctx.content_type)?;
        if request.host.is_empty() {
            return Err(ClientError::InvalidEndpoint("endpoint host is empty".into()));
        }
        let host = request.host.clone();
        let service = service_name(&host);
        let date = format_date(ctx.timestamp)?;

        let content_type_header = match content_type {
            ContentType::FormUrlEncoded => {
                request.query = encode_form(&flatten_value(params));
                request.body.clear();
                content_type.as_str().to_string()
            }
            ContentType::Json => {
                request.body = encode_json(&tree)?;
                content_type.as_str().to_string()
            }
            ContentType::Multipart => {
                let boundary = self.boundary.clone().unwrap_or_else(new_boundary);
                request.body = encode_multipart(&tree, &boundary)?;
                format!("{content_type}; boundary={boundary}")
            }
        };

        request.set_header("content-type", &content_type_header)?;
        request.set_header("host", &host)?;
        request.set_header(X_TC_ACTION, ctx.action_name())?;
        request.set_header(X_TC_REQUEST_CLIENT, ctx.request_client)?;
        request.set_header(X_TC_NONCE, ctx.nonce.to_string())?;
        request.set_header(X_TC_TIMESTAMP, ctx.timestamp.to_string())?;
        request.set_header(X_TC_VERSION, ctx.api_version)?;
        if ctx.unsigned_payload {
            request.set_header(X_TC_CONTENT_SHA256, UNSIGNED_PAYLOAD)?;
        }
        if let Some(region) = ctx.region.filter(|region| !region.is_empty()) {
            request.set_header(X_TC_REGION, region)?;
        }
        if let Some(token) = ctx.credential.token.as_deref().filter(|token| !token.is_empty()) {
            request.set_header(X_TC_TOKEN, token)?;
        }

        let payload_hash = if ctx.unsigned_payload {
            sha256_hex(UNSIGNED_PAYLOAD)
        } else {
            sha256_hex(&request.body)
        };
        let canonical_query = if request.method == Method::GET {
            request.query.as_str()
        } else {
            ""
        };
        let canonical_request = CanonicalRequest {
            method: &request.method,
            uri: &request.path,
            query: canonical_query,
            content_type: &content_type_header,
            host: &host,
            payload_hash: &payload_hash,
        }
        .to_string();
        trace!(%canonical_request, "tc3 canonical request");

        let scope = CredentialScope {
            date: &date,
            service,
        };
        let string_to_sign = StringToSign {
            timestamp: ctx.timestamp,
            scope: &scope,
            hashed_request: &sha256_hex(&canonical_request),
        }
        .to_string();
        trace!(%string_to_sign, "tc3 string to sign");

        let signature = tc3_signature(&ctx.credential.secret_key, &date, service, &string_to_sign);
        let authorization = format!(
            "{TC3_ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            ctx.credential.secret_id
        );
        request.set_header("authorization", authorization)?;
        Ok(())
    }

    fn algorithm(&self) -> &str {
        TC3_ALGORITHM
    }
}

/// Picks the body encoding from the HTTP method and the service's declared
/// content type.
///
/// GET always sends a form-encoded query string. POST sends JSON unless the
/// service declares multipart. Other methods use the declared type, which
/// must describe a body.
pub fn resolve_content_type(method: &Method, declared: ContentType) -> Result<ContentType> {
    match *method {
        Method::GET => Ok(ContentType::FormUrlEncoded),
        Method::POST if declared == ContentType::Multipart => Ok(ContentType::Multipart),
        Method::POST => Ok(ContentType::Json),
        _ => match declared {
            ContentType::FormUrlEncoded => Err(ClientError::UnsupportedContentType(format!(
                "{declared} cannot carry a {method} body"
            ))),
            other => Ok(other),
        },
    }
}

/// First dot-delimited label of the endpoint host.
pub fn service_name(host: &str) -> &str {
    host.split('.').next().unwrap_or(host)
}

/// UTC calendar date (`YYYY-MM-DD`) of a Unix timestamp.
pub fn format_date(timestamp: i64) -> Result<String> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|utc| utc.format("%Y-%m-%d").to_string())
        .ok_or_else(|| ClientError::InvalidRequest(format!("timestamp {timestamp} is out of range")))
}

/// `METHOD \n URI \n QUERY \n HEADERS \n SIGNED_HEADERS \n PAYLOAD_HASH`
#[derive(Debug, PartialEq)]
pub struct CanonicalRequest<'a> {
    pub method: &'a Method,
    pub uri: &'a str,
    pub query: &'a str,
    pub content_type: &'a str,
    pub host: &'a str,
    pub payload_hash: &'a str,
}

impl fmt::Display for CanonicalRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.uri)?;
        writeln!(f, "{}", self.query)?;
        writeln!(f, "content-type:{}", self.content_type)?;
        writeln!(f, "host:{}", self.host)?;
        writeln!(f)?;
        writeln!(f, "{SIGNED_HEADERS}")?;
        write!(f, "{}", self.payload_hash)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct CredentialScope<'a> {
    pub date: &'a str,
    pub service: &'a str,
}

impl fmt::Display for CredentialScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{TC3_REQUEST}", self.date, self.service)
    }
}

#[derive(Debug, PartialEq)]
pub struct StringToSign<'a> {
    pub timestamp: i64,
    pub scope: &'a CredentialScope<'a>,
    pub hashed_request: &'a str,
}

impl fmt::Display for StringToSign<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{TC3_ALGORITHM}\n{}\n{}\n{}",
            self.timestamp, self.scope, self.hashed_request
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credential;
    use crate::signing::SignatureMethod;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn context<'a>(credential: &'a Credential) -> SigningContext<'a> {
        SigningContext {
            action: "DescribeInstances",
            credential,
            region: Some("ap-guangzhou"),
            api_version: "2017-03-12",
            request_client: "SDK_RUST_TEST",
            timestamp: 1551113065,
            nonce: 12345,
            method: SignatureMethod::Tc3HmacSha256,
            unsigned_payload: false,
            content_type: ContentType::FormUrlEncoded,
        }
    }

    fn signed(ctx: &SigningContext<'_>, method: Method, params: &Value) -> RequestDescriptor {
        let mut request = RequestDescriptor::new("cvm.tencentcloudapi.com", method, "/");
        Tc3Signer::with_boundary("BOUNDARY")
            .sign(ctx, params, &mut request)
            .unwrap();
        request
    }

    fn signature_of(request: &RequestDescriptor) -> String {
        let auth = request.header("authorization").unwrap();
        auth.rsplit("Signature=").next().unwrap().to_string()
    }

    #[test]
    fn content_type_resolution() {
        use ContentType::*;
        assert_eq!(resolve_content_type(&Method::GET, Json).unwrap(), FormUrlEncoded);
        assert_eq!(resolve_content_type(&Method::POST, FormUrlEncoded).unwrap(), Json);
        assert_eq!(resolve_content_type(&Method::POST, Multipart).unwrap(), Multipart);
        assert_eq!(resolve_content_type(&Method::PUT, Multipart).unwrap(), Multipart);
        assert_eq!(resolve_content_type(&Method::PUT, Json).unwrap(), Json);
        assert!(matches!(
            resolve_content_type(&Method::PUT, FormUrlEncoded),
            Err(ClientError::UnsupportedContentType(_))
        ));
    }

    #[test]
    fn service_is_first_host_label() {
        assert_eq!(service_name("cvm.tencentcloudapi.com"), "cvm");
        assert_eq!(service_name("cvm.ap-shanghai.tencentcloudapi.com"), "cvm");
        assert_eq!(service_name("localhost"), "localhost");
    }

    #[test]
    fn date_is_utc() {
        assert_eq!(format_date(1551113065).unwrap(), "2019-02-25");
        assert_eq!(format_date(1609459199).unwrap(), "2020-12-31");
        assert_eq!(format_date(1609459200).unwrap(), "2021-01-01");
    }

    #[test]
    fn canonical_request_layout() {
        let creq = CanonicalRequest {
            method: &Method::POST,
            uri: "/",
            query: "",
            content_type: "application/json",
            host: "cvm.tencentcloudapi.com",
            payload_hash: "abc",
        };
        assert_eq!(
            creq.to_string(),
            "POST\n/\n\ncontent-type:application/json\nhost:cvm.tencentcloudapi.com\n\ncontent-type;host\nabc"
        );
    }

    #[test]
    fn string_to_sign_layout() {
        let scope = CredentialScope {
            date: "2019-02-25",
            service: "cvm",
        };
        let sts = StringToSign {
            timestamp: 1551113065,
            scope: &scope,
            hashed_request: "deadbeef",
        };
        assert_eq!(
            sts.to_string(),
            "TC3-HMAC-SHA256\n1551113065\n2019-02-25/cvm/tc3_request\ndeadbeef"
        );
    }

    #[test]
    fn post_sends_json_and_protocol_headers() {
        let credential = Credential::new("AKIDexample", "secret").with_token("session");
        let request = signed(&context(&credential), Method::POST, &json!({"Limit": 1}));

        assert_eq!(request.body, br#"{"Limit":1}"#);
        assert!(request.query.is_empty());
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("host"), Some("cvm.tencentcloudapi.com"));
        assert_eq!(request.header("x-tc-action"), Some("DescribeInstances"));
        assert_eq!(request.header("x-tc-requestclient"), Some("SDK_RUST_TEST"));
        assert_eq!(request.header("x-tc-nonce"), Some("12345"));
        assert_eq!(request.header("x-tc-timestamp"), Some("1551113065"));
        assert_eq!(request.header("x-tc-version"), Some("2017-03-12"));
        assert_eq!(request.header("x-tc-region"), Some("ap-guangzhou"));
        assert_eq!(request.header("x-tc-token"), Some("session"));
        assert!(request.header("x-tc-content-sha256").is_none());

        let auth = request.header("authorization").unwrap();
        assert!(auth.starts_with(
            "TC3-HMAC-SHA256 Credential=AKIDexample/2019-02-25/cvm/tc3_request, SignedHeaders=content-type;host, Signature="
        ));
        assert_eq!(signature_of(&request).len(), 64);
    }

    #[test]
    fn get_sends_sorted_query_and_empty_body() {
        let credential = Credential::new("id", "key");
        let request = signed(
            &context(&credential),
            Method::GET,
            &json!({"Offset": 0, "Limit": 2, "InstanceIds": ["a"]}),
        );
        assert!(request.body.is_empty());
        assert_eq!(request.query, "InstanceIds.0=a&Limit=2&Offset=0");
        assert_eq!(
            request.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn multipart_content_type_carries_boundary() {
        let credential = Credential::new("id", "key");
        let mut ctx = context(&credential);
        ctx.content_type = ContentType::Multipart;
        let request = signed(&ctx, Method::POST, &json!({"Name": "demo"}));
        assert_eq!(
            request.header("content-type"),
            Some("multipart/form-data; boundary=BOUNDARY")
        );
        assert!(String::from_utf8(request.body).unwrap().ends_with("--BOUNDARY--\r\n"));
    }

    #[test]
    fn unsigned_payload_ignores_body() {
        let credential = Credential::new("id", "key");
        let mut ctx = context(&credential);
        ctx.unsigned_payload = true;
        let a = signed(&ctx, Method::POST, &json!({"Limit": 1}));
        let b = signed(&ctx, Method::POST, &json!({"Limit": 2}));
        assert_eq!(a.header("x-tc-content-sha256"), Some("UNSIGNED-PAYLOAD"));
        assert_ne!(a.body, b.body);
        assert_eq!(signature_of(&a), signature_of(&b));
    }

    #[test]
    fn signature_binds_method_payload_and_host() {
        let credential = Credential::new("id", "key");
        let ctx = context(&credential);
        let base = signature_of(&signed(&ctx, Method::POST, &json!({"Limit": 1})));

        assert_ne!(base, signature_of(&signed(&ctx, Method::POST, &json!({"Limit": 2}))));
        assert_ne!(base, signature_of(&signed(&ctx, Method::GET, &json!({"Limit": 1}))));

        let mut request = RequestDescriptor::new("cvm.ap-beijing.tencentcloudapi.com", Method::POST, "/");
        Tc3Signer::new().sign(&ctx, &json!({"Limit": 1}), &mut request).unwrap();
        assert_ne!(base, signature_of(&request));

        let mut request = RequestDescriptor::new("cvm.tencentcloudapi.com", Method::POST, "/v2");
        Tc3Signer::new().sign(&ctx, &json!({"Limit": 1}), &mut request).unwrap();
        assert_ne!(base, signature_of(&request));
    }

    #[test]
    fn signature_ignores_unsigned_headers() {
        let credential = Credential::new("id", "key");
        let ctx = context(&credential);
        let a = signed(&ctx, Method::POST, &json!({}));
        let mut other = ctx.clone();
        other.nonce = 99;
        let b = signed(&other, Method::POST, &json!({}));
        assert_eq!(signature_of(&a), signature_of(&b));
    }

    #[test]
    fn rejects_form_body_for_put() {
        let credential = Credential::new("id", "key");
        let mut request = RequestDescriptor::new("cvm.tencentcloudapi.com", Method::PUT, "/");
        let err = Tc3Signer::new()
            .sign(&context(&credential), &json!({}), &mut request)
            .unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedContentType(_)));
        assert!(request.header("authorization").is_none());
    }

    #[test]
    fn rejects_empty_host() {
        let credential = Credential::new("id", "key");
        let mut request = RequestDescriptor::new("", Method::POST, "/");
        let err = Tc3Signer::new()
            .sign(&context(&credential), &json!({}), &mut request)
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidEndpoint(_)));
    }
}
