use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;

use crate::error::{ClientError, Result};

/// An in-flight API request, filled in progressively by a signer.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub scheme: String,
    pub host: String,
    pub method: Method,
    pub path: String,
    /// Already encoded query string, without the leading `?`.
    pub query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RequestDescriptor {
    pub fn new(host: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            scheme: "https".to_string(),
            host: host.into(),
            method,
            path: path.into(),
            query: String::new(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn uri(&self) -> String {
        if self.query.is_empty() {
            format!("{}://{}{}", self.scheme, self.host, self.path)
        } else {
            format!("{}://{}{}?{}", self.scheme, self.host, self.path, self.query)
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Sets a header, replacing any previous value.
    pub fn set_header(&mut self, name: &'static str, value: impl AsRef<str>) -> Result<()> {
        let value = HeaderValue::from_str(value.as_ref())
            .map_err(|e| ClientError::InvalidRequest(format!("header {name}: {e}")))?;
        self.headers.insert(HeaderName::from_static(name), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_without_query() {
        let request = RequestDescriptor::new("cvm.tencentcloudapi.com", Method::POST, "/");
        assert_eq!(request.uri(), "https://cvm.tencentcloudapi.com/");
    }

    #[test]
    fn uri_with_query_and_scheme() {
        let mut request = RequestDescriptor::new("localhost:8080", Method::GET, "/").with_scheme("http");
        request.query = "Limit=1".into();
        assert_eq!(request.uri(), "http://localhost:8080/?Limit=1");
    }

    #[test]
    fn headers_are_case_insensitive() {
        let mut request = RequestDescriptor::new("h", Method::GET, "/");
        request.set_header("x-tc-action", "DescribeZones").unwrap();
        assert_eq!(request.header("X-TC-Action"), Some("DescribeZones"));
    }

    #[test]
    fn rejects_header_values_with_newlines() {
        let mut request = RequestDescriptor::new("h", Method::GET, "/");
        let err = request.set_header("x-tc-token", "bad\ntoken").unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
