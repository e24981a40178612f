use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ClientProfile, Credential, ServiceDescriptor};
use crate::error::{ClientError, Result};
use crate::request::RequestDescriptor;
use crate::signing::{Clock, NonceSource, RandomNonce, SigningContext, SystemClock, signer_for};
use crate::transport::{Transport, TransportResponse};

/// SDK identifier sent with every request.
pub const SDK_VERSION: &str = concat!("SDK_RUST_", env!("CARGO_PKG_VERSION"));

/// Signs and dispatches API calls for a single service.
///
/// The client holds only immutable configuration; every call computes its
/// own timestamp and nonce, so one client can serve concurrent calls.
pub struct ApiClient {
    credential: Credential,
    region: Option<String>,
    profile: ClientProfile,
    service: ServiceDescriptor,
    transport: Arc<dyn Transport>,
    nonce: Arc<dyn NonceSource>,
    clock: Arc<dyn Clock>,
    request_client: String,
}

impl ApiClient {
    pub fn new(
        credential: Credential,
        region: impl Into<String>,
        profile: ClientProfile,
        service: ServiceDescriptor,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        credential.validate()?;
        let region = region.into();
        Ok(Self {
            credential,
            region: (!region.is_empty()).then_some(region),
            profile,
            service,
            transport,
            nonce: Arc::new(RandomNonce),
            clock: Arc::new(SystemClock),
            request_client: SDK_VERSION.to_string(),
        })
    }

    pub fn with_nonce_source(mut self, nonce: Arc<dyn NonceSource>) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Overrides the `RequestClient` identifier.
    pub fn with_request_client(mut self, request_client: impl Into<String>) -> Self {
        self.request_client = request_client.into();
        self
    }

    pub fn profile(&self) -> &ClientProfile {
        &self.profile
    }

    /// Profile override if set, else the service default.
    pub fn endpoint(&self) -> &str {
        self.profile
            .http
            .endpoint
            .as_deref()
            .filter(|endpoint| !endpoint.is_empty())
            .unwrap_or(self.service.endpoint.as_str())
    }

    /// Builds and signs the request for `action` without sending it.
    pub fn build_request<T: Serialize + ?Sized>(&self, action: &str, params: &T) -> Result<RequestDescriptor> {
        if action.is_empty() {
            return Err(ClientError::ClientParams("action name is empty".into()));
        }
        let endpoint = self.endpoint();
        if endpoint.is_empty() {
            return Err(ClientError::InvalidEndpoint("no endpoint configured".into()));
        }

        let params = serde_json::to_value(params)?;
        let method = self.profile.sign_method;
        let signer = signer_for(method)?;

        let ctx = SigningContext {
            action,
            credential: &self.credential,
            region: self.region.as_deref(),
            api_version: &self.service.api_version,
            request_client: &self.request_client,
            timestamp: self.clock.now(),
            nonce: self.nonce.next_nonce(),
            method,
            unsigned_payload: self.profile.unsigned_payload,
            content_type: self.service.content_type,
        };

        let mut request = RequestDescriptor::new(
            endpoint,
            self.profile.http.method.clone(),
            self.service.request_path.clone(),
        )
        .with_scheme(self.profile.http.scheme.clone());
        signer.sign(&ctx, &params, &mut request)?;

        debug!(
            action = %ctx.action_name(),
            algorithm = signer.algorithm(),
            method = %request.method,
            host = %request.host,
            "signed request"
        );
        Ok(request)
    }

    /// Signs and sends `action`, returning the raw response text.
    pub async fn call<T: Serialize + ?Sized>(&self, action: &str, params: &T) -> Result<String> {
        let request = self.build_request(action, params)?;
        let response = self
            .transport
            .send(&request, self.profile.http.timeout())
            .await?;
        let response = check_status(response)?;
        String::from_utf8(response.body)
            .map_err(|e| ClientError::Network(format!("response body is not valid UTF-8: {e}")))
    }

    /// Like [`call`](Self::call), parsing the response text as JSON.
    pub async fn call_json<T: Serialize + ?Sized>(&self, action: &str, params: &T) -> Result<Value> {
        let text = self.call(action, params).await?;
        serde_json::from_str(&text)
            .map_err(|e| ClientError::Network(format!("response body is not valid JSON: {e}")))
    }
}

fn check_status(response: TransportResponse) -> Result<TransportResponse> {
    if response.status != 200 {
        warn!(status = response.status, "server returned non-200 status");
        return Err(ClientError::ServerStatus {
            status: response.status,
            body: response.body,
        });
    }
    Ok(response)
}
