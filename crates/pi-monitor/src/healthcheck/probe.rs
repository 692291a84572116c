//! HTTP probe
//!
//! A single GET against a target. Only HTTP 200 counts as success.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{MonitorError, Result};

/// Message used when the target has no URL
pub const NO_URL_MESSAGE: &str = "no url defined";

/// Message used when the request itself failed
pub const REQUEST_FAILED_MESSAGE: &str = "Unknown status failure";

/// Outcome of one probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The target answered 200
    pub success: bool,

    /// Failure description, empty on success
    pub message: String,

    /// HTTP status, if a response was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Response body of a successful probe
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_response: String,
}

impl ProbeResult {
    pub fn failure(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            success: false,
            message: message.into(),
            status,
            raw_response: String::new(),
        }
    }

    pub fn ok(raw_response: String) -> Self {
        Self {
            success: true,
            message: String::new(),
            status: Some(StatusCode::OK.as_u16()),
            raw_response,
        }
    }
}

/// Performs HTTP GET probes
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    /// Fetch `url`; an empty URL fails without touching the network
    pub async fn get(&self, url: &str) -> ProbeResult {
        if url.is_empty() {
            return ProbeResult::failure(NO_URL_MESSAGE, None);
        }

        tracing::info!("Requesting {}", url);
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Request failed exception {}", e);
                return ProbeResult::failure(REQUEST_FAILED_MESSAGE, None);
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Request failed exception {}", e);
                return ProbeResult::failure(REQUEST_FAILED_MESSAGE, Some(status.as_u16()));
            }
        };

        if status != StatusCode::OK {
            tracing::info!(
                "Request failed with Response Code {}: {}",
                status.as_u16(),
                text
            );
            return ProbeResult::failure(
                format!("{} {}", status.as_u16(), text),
                Some(status.as_u16()),
            );
        }

        ProbeResult::ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn probe() -> HttpProbe {
        HttpProbe::new(Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_empty_url() {
        let result = probe().get("").await;
        assert!(!result.success);
        assert_eq!(result.message, NO_URL_MESSAGE);
        assert_eq!(result.status, None);
    }

    #[tokio::test]
    async fn test_blank_url_is_requested() {
        let result = probe().get("   ").await;
        assert!(!result.success);
        assert_eq!(result.message, REQUEST_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&server)
            .await;

        let result = probe().get(&format!("{}/health", server.uri())).await;
        assert!(result.success);
        assert_eq!(result.raw_response, "OK");
        assert!(result.message.is_empty());
    }

    #[tokio::test]
    async fn test_non_200_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Page Not Found"))
            .mount(&server)
            .await;

        let result = probe().get(&server.uri()).await;
        assert!(!result.success);
        assert_eq!(result.message, "404 Page Not Found");
        assert_eq!(result.status, Some(404));
    }

    #[tokio::test]
    async fn test_other_2xx_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let result = probe().get(&server.uri()).await;
        assert!(!result.success);
        assert_eq!(result.message, "204 ");
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let result = probe().get("http://127.0.0.1:9/").await;
        assert!(!result.success);
        assert_eq!(result.message, REQUEST_FAILED_MESSAGE);
    }
}
