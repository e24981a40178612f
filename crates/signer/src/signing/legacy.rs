use http::Method;
use serde_json::Value;
use tracing::trace;

use super::context::SigningContext;
use super::crypto::{LegacyAlgorithm, legacy_signature};
use super::signer::RequestSigner;
use super::SignatureMethod;
use crate::encoding::{ContentType, encode_form};
use crate::error::{ClientError, Result};
use crate::params::{CanonicalParams, flatten_value, require_mapping};
use crate::request::RequestDescriptor;

/// Query-string HMAC signer (`HmacSHA1` / `HmacSHA256`).
///
/// Authentication material travels as ordinary form fields next to the
/// flattened parameters; the `Signature` field covers all of them.
#[derive(Debug, Clone, Copy)]
pub struct LegacySigner {
    method: SignatureMethod,
    algorithm: LegacyAlgorithm,
}

impl LegacySigner {
    pub fn new(method: SignatureMethod) -> Result<Self> {
        let algorithm = match method {
            SignatureMethod::HmacSha1 => LegacyAlgorithm::Sha1,
            SignatureMethod::HmacSha256 => LegacyAlgorithm::Sha256,
            other => {
                return Err(ClientError::UnsupportedSignatureMethod(format!(
                    "{other} is not a query-string signature method"
                )));
            }
        };
        Ok(Self { method, algorithm })
    }

    pub fn method(&self) -> SignatureMethod {
        self.method
    }

    /// Flattened parameters plus the protocol fields, before `Signature`.
    fn unsigned_fields(&self, ctx: &SigningContext<'_>, params: &Value) -> Result<CanonicalParams> {
        let tree = Value::Object(require_mapping(params)?);
        let mut fields = flatten_value(&tree);

        fields.insert("Action".into(), ctx.action_name());
        fields.insert("RequestClient".into(), ctx.request_client.to_string());
        fields.insert("Nonce".into(), ctx.nonce.to_string());
        fields.insert("Timestamp".into(), ctx.timestamp.to_string());
        fields.insert("Version".into(), ctx.api_version.to_string());
        if let Some(region) = ctx.region.filter(|region| !region.is_empty()) {
            fields.insert("Region".into(), region.to_string());
        }
        if let Some(token) = ctx.credential.token.as_deref().filter(|token| !token.is_empty()) {
            fields.insert("Token".into(), token.to_string());
        }
        if !ctx.credential.secret_id.is_empty() {
            fields.insert("SecretId".into(), ctx.credential.secret_id.clone());
        }
        fields.insert("SignatureMethod".into(), self.method.as_str().to_string());
        Ok(fields)
    }
}

impl RequestSigner for LegacySigner {
    fn sign(&self, ctx: &SigningContext<'_>, params: &Value, request: &mut RequestDescriptor) -> Result<()> {
        let mut fields = self.unsigned_fields(ctx, params)?;

        let string_to_sign = string_to_sign(&request.method, &request.host, &request.path, &fields);
        trace!(%string_to_sign, "legacy string to sign");
        let signature = legacy_signature(&ctx.credential.secret_key, &string_to_sign, self.algorithm);
        fields.insert("Signature".into(), signature);

        let encoded = encode_form(&fields);
        let host = request.host.clone();
        request.set_header("host", host)?;
        if request.method == Method::GET {
            request.query = encoded;
        } else {
            request.set_header("content-type", ContentType::FormUrlEncoded.as_str())?;
            request.body = encoded.into_bytes();
        }
        Ok(())
    }

    fn algorithm(&self) -> &str {
        self.method.as_str()
    }
}

/// `METHOD HOST PATH ? k=v&...` with raw values, keys sorted after every
/// `_` in a key is replaced by `.`.
pub fn string_to_sign(method: &Method, host: &str, path: &str, fields: &CanonicalParams) -> String {
    let normalized: CanonicalParams = fields
        .iter()
        .map(|(key, value)| (key.replace('_', "."), value.clone()))
        .collect();
    let query = normalized
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{method}{host}{path}?{query}")
}
