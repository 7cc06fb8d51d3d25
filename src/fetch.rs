use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("yf-options/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Network { source, .. } if source.is_timeout())
    }
}

/// Anything that can turn a URL into a decoded JSON document.
#[async_trait]
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

/// Plain HTTP GET against the provider. One request per call, no retries.
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(HttpPageSource { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let network = |source| FetchError::Network {
            url: url.to_string(),
            source,
        };

        let resp = self.client.get(url).send().await.map_err(network)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Read the body first so a transport error and bad JSON stay distinguishable.
        let body = resp.text().await.map_err(network)?;
        tracing::trace!(url, bytes = body.len(), "fetched page");
        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn source() -> HttpPageSource {
        HttpPageSource::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn decodes_json_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/options/XYZ");
                then.status(200).body(r#"{"optionChain":{"result":[]}}"#);
            })
            .await;

        let doc = source().fetch(&server.url("/options/XYZ")).await.unwrap();
        assert!(doc["optionChain"]["result"].is_array());
    }

    #[tokio::test]
    async fn non_success_status_is_status_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/options/XYZ");
                then.status(404).body("not found");
            })
            .await;

        let err = source().fetch(&server.url("/options/XYZ")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }), "{err}");
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/options/XYZ");
                then.status(200).body("{ not json");
            })
            .await;

        let err = source().fetch(&server.url("/options/XYZ")).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }), "{err}");
    }

    #[tokio::test]
    async fn slow_response_is_a_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/options/XYZ");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .body(r#"{"optionChain":{"result":[]}}"#);
            })
            .await;

        let source = HttpPageSource::new(Duration::from_secs(1)).unwrap();
        let err = source.fetch(&server.url("/options/XYZ")).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }), "{err}");
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        // Port 9 (discard) is not expected to accept HTTP on loopback.
        let err = source()
            .fetch("http://127.0.0.1:9/options/XYZ")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }), "{err}");
        assert!(!err.is_timeout());
    }
}
