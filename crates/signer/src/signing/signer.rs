use serde_json::Value;

use super::context::SigningContext;
use crate::error::Result;
use crate::request::RequestDescriptor;

/// Turns a parameter tree into a signed, transport-ready request.
///
/// Implementations are sync and pure apart from the boundary/nonce inputs
/// carried in the context; signing is CPU-bound.
pub trait RequestSigner: Send + Sync {
    /// Fills in headers, query string and body of `request`.
    fn sign(&self, ctx: &SigningContext<'_>, params: &Value, request: &mut RequestDescriptor) -> Result<()>;

    /// Protocol identifier string (e.g. "TC3-HMAC-SHA256").
    fn algorithm(&self) -> &str;
}
