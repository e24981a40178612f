use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use super::SignatureMethod;
use crate::config::Credential;
use crate::encoding::ContentType;

/// Per-call inputs shared by both signing protocols.
#[derive(Debug, Clone)]
pub struct SigningContext<'a> {
    pub action: &'a str,
    pub credential: &'a Credential,
    pub region: Option<&'a str>,
    pub api_version: &'a str,
    /// SDK identifier sent as `RequestClient`.
    pub request_client: &'a str,
    /// Unix seconds.
    pub timestamp: i64,
    pub nonce: u64,
    pub method: SignatureMethod,
    pub unsigned_payload: bool,
    /// Body encoding the target service declares for non-GET requests.
    pub content_type: ContentType,
}

impl SigningContext<'_> {
    /// Action name with its first character uppercased.
    pub fn action_name(&self) -> String {
        let mut chars = self.action.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Produces the per-call `Nonce`. Only uniqueness matters.
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> u64;
}

/// Uniform in `1..=i64::MAX`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomNonce;

impl NonceSource for RandomNonce {
    fn next_nonce(&self) -> u64 {
        rand::thread_rng().gen_range(1..=i64::MAX as u64)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedNonce(pub u64);

impl NonceSource for FixedNonce {
    fn next_nonce(&self) -> u64 {
        self.0
    }
}

/// Source of the request timestamp in Unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as i64)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}
