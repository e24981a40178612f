use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Terminal segment of every TC3 credential scope.
pub const TC3_REQUEST: &str = "tc3_request";

/// Digest used by the legacy query-string protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyAlgorithm {
    Sha1,
    Sha256,
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(bytes.as_ref()))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Base64 HMAC of `string_to_sign`, keyed by the raw secret key.
pub fn legacy_signature(secret_key: &str, string_to_sign: &str, algorithm: LegacyAlgorithm) -> String {
    let digest = match algorithm {
        LegacyAlgorithm::Sha1 => {
            let mut mac =
                HmacSha1::new_from_slice(secret_key.as_bytes()).expect("HMAC can take key of any size");
            mac.update(string_to_sign.as_bytes());
            mac.finalize().into_bytes().to_vec()
        }
        LegacyAlgorithm::Sha256 => hmac_sha256(secret_key.as_bytes(), string_to_sign.as_bytes()),
    };
    BASE64.encode(digest)
}

/// Derives the date and service scoped TC3 signing key.
pub fn tc3_signing_key(secret_key: &str, date: &str, service: &str) -> Vec<u8> {
    // kDate    = HMAC("TC3" + secret, date)
    // kService = HMAC(kDate, service)
    // kSigning = HMAC(kService, "tc3_request")
    let secret = format!("TC3{secret_key}");
    let k_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
    let k_service = hmac_sha256(&k_date, service.as_bytes());
    hmac_sha256(&k_service, TC3_REQUEST.as_bytes())
}

/// Hex signature of a TC3 string-to-sign.
pub fn tc3_signature(secret_key: &str, date: &str, service: &str, string_to_sign: &str) -> String {
    let signing_key = tc3_signing_key(secret_key, date, service);
    hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sha256_of_empty_string() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hmac_sha256_rfc4231_case_2() {
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn legacy_signature_digest_lengths() {
        let sha1 = BASE64
            .decode(legacy_signature("key", "data", LegacyAlgorithm::Sha1))
            .unwrap();
        let sha256 = BASE64
            .decode(legacy_signature("key", "data", LegacyAlgorithm::Sha256))
            .unwrap();
        assert_eq!(sha1.len(), 20);
        assert_eq!(sha256.len(), 32);
    }

    #[test]
    fn signing_key_depends_on_every_input() {
        let base = tc3_signing_key("secret", "2021-01-01", "example");
        assert_eq!(base.len(), 32);
        assert_ne!(base, tc3_signing_key("secret2", "2021-01-01", "example"));
        assert_ne!(base, tc3_signing_key("secret", "2021-01-02", "example"));
        assert_ne!(base, tc3_signing_key("secret", "2021-01-01", "cvm"));
    }

    #[test]
    fn signing_key_is_nested_hmac_chain() {
        let manual = hmac_sha256(
            &hmac_sha256(&hmac_sha256(b"TC3secret", b"2021-01-01"), b"example"),
            b"tc3_request",
        );
        assert_eq!(tc3_signing_key("secret", "2021-01-01", "example"), manual);
    }
}
