mod context;
mod crypto;
mod legacy;
mod method;
mod signer;
mod tc3;

pub use context::{Clock, FixedClock, FixedNonce, NonceSource, RandomNonce, SigningContext, SystemClock};
pub use crypto::{LegacyAlgorithm, legacy_signature, sha256_hex, tc3_signature, tc3_signing_key};
pub use legacy::{LegacySigner, string_to_sign as legacy_string_to_sign};
pub use method::SignatureMethod;
pub use signer::RequestSigner;
pub use tc3::{
    CanonicalRequest, CredentialScope, StringToSign, Tc3Signer, format_date, resolve_content_type,
    service_name,
};

use crate::error::Result;

/// Signer for the configured protocol.
pub fn signer_for(method: SignatureMethod) -> Result<Box<dyn RequestSigner>> {
    Ok(match method {
        SignatureMethod::HmacSha1 | SignatureMethod::HmacSha256 => Box::new(LegacySigner::new(method)?),
        SignatureMethod::Tc3HmacSha256 => Box::new(Tc3Signer::new()),
    })
}
