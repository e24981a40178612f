use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use crate::error::{ClientError, Result};
use crate::request::RequestDescriptor;

/// Status and raw payload returned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends a fully signed request.
///
/// Implementations enforce `timeout` themselves and never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor, timeout: Duration) -> Result<TransportResponse>;
}

/// Pooled HTTP/1 client over native TLS.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpsConnector::new());
        Self { client }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn to_http_request(request: &RequestDescriptor) -> Result<http::Request<Full<Bytes>>> {
    let mut builder = http::Request::builder()
        .method(request.method.clone())
        .uri(request.uri());
    if let Some(headers) = builder.headers_mut() {
        headers.extend(request.headers.clone());
    }
    builder
        .body(Full::new(Bytes::from(request.body.clone())))
        .map_err(|e| ClientError::InvalidRequest(e.to_string()))
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, request: &RequestDescriptor, timeout: Duration) -> Result<TransportResponse> {
        let http_request = to_http_request(request)?;

        let exchange = async {
            let response = self
                .client
                .request(http_request)
                .await
                .context("sending request")?;
            let status = response.status().as_u16();
            let body = response
                .into_body()
                .collect()
                .await
                .context("reading response body")?
                .to_bytes();
            Ok::<_, anyhow::Error>(TransportResponse {
                status,
                body: body.to_vec(),
            })
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(ClientError::Network(format!("{e:#}"))),
            Err(_) => Err(ClientError::Timeout(timeout)),
        }
    }
}
