//! statuspage.io API client
//!
//! Typed wrapper over the component and incident endpoints of
//! <https://developer.statuspage.io/>. Every call is independently
//! fallible: failures are logged here and handed back as a `ClientError`
//! value, never as a panic.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::{StatusPageSettings, DEFAULT_STATUS_PAGE_BASE_URL};
use crate::contracts::*;
use crate::error::{MonitorError, Result};

const CLIENT_ERROR_MESSAGE: &str = "Request failed exception:";

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Configuration for the statuspage.io client
#[derive(Debug, Clone)]
pub struct StatusPageClientConfig {
    /// API base, without the page id
    pub base_url: String,

    /// Page the components and incidents belong to
    pub page_id: String,

    /// OAuth API key
    pub api_key: String,

    /// Request timeout
    pub timeout: Duration,
}

impl StatusPageClientConfig {
    pub fn new(api_key: impl Into<String>, page_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_STATUS_PAGE_BASE_URL.to_string(),
            page_id: page_id.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_settings(settings: &StatusPageSettings, timeout: Duration) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            page_id: settings.page_id.clone(),
            api_key: settings.api_key.clone(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for one statuspage.io page
#[derive(Debug, Clone)]
pub struct StatusPageClient {
    client: Client,
    page_url: String,
}

impl StatusPageClient {
    /// Create a client for the default API base
    pub fn new(api_key: impl Into<String>, page_id: impl Into<String>) -> Result<Self> {
        Self::with_config(StatusPageClientConfig::new(api_key, page_id))
    }

    /// Create a client with custom configuration
    pub fn with_config(config: StatusPageClientConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers(Self::headers(&config.api_key)?)
            .timeout(config.timeout)
            .build()
            .map_err(|e| MonitorError::HttpClient(e.to_string()))?;

        let page_url = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.page_id
        );

        Ok(Self { client, page_url })
    }

    /// `Authorization` and `Content-Type` headers sent with every request
    fn headers(api_key: &str) -> Result<HeaderMap> {
        let mut auth = HeaderValue::from_str(&format!("OAuth {}", api_key))
            .map_err(|e| MonitorError::config(format!("invalid status page api key: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Base URL of the page, e.g. `https://api.statuspage.io/v1/pages/{page_id}`
    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    fn component_url(&self, component_id: &str) -> String {
        format!("{}/components/{}", self.page_url, component_id)
    }

    /// Retrieve a component.
    ///
    /// A 404 is logged as a missing component; callers get `NotFound` but
    /// should treat it like any other failure.
    pub async fn get_component(&self, component_id: &str) -> ClientResult<RemoteComponent> {
        let url = self.component_url(component_id);
        tracing::debug!(url = %url, "Retrieving component from StatusPage");

        let result: ClientResult<RemoteComponent> = match self.client.get(&url).send().await {
            Ok(response) => decode(response, &url).await,
            Err(e) => Err(e.into()),
        };

        match &result {
            Err(ClientError::NotFound { .. }) => {
                tracing::warn!("Component {} not found", component_id);
            }
            Err(e) => tracing::error!("{} {}", CLIENT_ERROR_MESSAGE, e),
            Ok(component) => {
                tracing::debug!(component_id, status = %component.status, "Component response")
            }
        }
        result
    }

    /// Set a component's status
    pub async fn update_component(
        &self,
        component_id: &str,
        status: ComponentStatus,
    ) -> ClientResult<RemoteComponent> {
        let url = self.component_url(component_id);
        tracing::debug!(component_id, status = %status, "Updating component");

        let request = self
            .client
            .put(&url)
            .json(&ComponentUpdateRequest::new(status));
        report(send(request, &url).await)
    }

    /// Retrieve every unresolved incident on the page
    pub async fn get_unresolved_incidents(&self) -> ClientResult<Vec<IncidentSummary>> {
        let url = format!("{}/incidents/unresolved", self.page_url);
        tracing::info!("Retrieving unresolved incidents");

        report(send(self.client.get(&url), &url).await)
    }

    /// Open a new incident
    pub async fn create_incident(
        &self,
        payload: &CreateIncidentRequest,
    ) -> ClientResult<IncidentSummary> {
        let url = format!("{}/incidents", self.page_url);
        tracing::info!("Creating incident: {}", url);

        let result: ClientResult<IncidentSummary> =
            report(send(self.client.post(&url).json(payload), &url).await);
        if let Ok(incident) = &result {
            tracing::debug!(incident_id = %incident.id, "Create Incident Response");
        }
        result
    }

    /// Update an existing incident; used to resolve incidents
    pub async fn update_incident(
        &self,
        incident_id: &str,
        payload: &IncidentUpdateRequest,
    ) -> ClientResult<IncidentSummary> {
        let url = format!("{}/incidents/{}", self.page_url, incident_id);
        tracing::info!("Updating incident {}: {}", url, incident_id);

        let result: ClientResult<IncidentSummary> =
            report(send(self.client.patch(&url).json(payload), &url).await);
        if let Ok(incident) = &result {
            tracing::debug!(incident_id = %incident.id, status = ?incident.status, "Update Incident Response");
        }
        result
    }
}

async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder, url: &str) -> ClientResult<T> {
    let response = request.send().await?;
    decode(response, url).await
}

async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> ClientResult<T> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound {
            resource: url.to_string(),
        });
    }

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Parse(e.to_string()))
}

fn report<T>(result: ClientResult<T>) -> ClientResult<T> {
    if let Err(e) = &result {
        tracing::error!("{} {}", CLIENT_ERROR_MESSAGE, e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> StatusPageClient {
        let config = StatusPageClientConfig::new("apikey", "pageid")
            .with_base_url(format!("{}/pages", server.uri()));
        StatusPageClient::with_config(config).unwrap()
    }

    #[test]
    fn test_page_url() {
        let client = StatusPageClient::new("key", "page-1").unwrap();
        assert_eq!(client.page_url(), "https://api.statuspage.io/v1/pages/page-1");

        let config = StatusPageClientConfig::new("key", "page-1").with_base_url("http://proxy/v1/pages/");
        let client = StatusPageClient::with_config(config).unwrap();
        assert_eq!(client.page_url(), "http://proxy/v1/pages/page-1");
    }

    #[test]
    fn test_invalid_api_key_header() {
        let err = StatusPageClient::new("bad\nkey", "page").unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }

    #[tokio::test]
    async fn test_get_component_sends_auth_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pages/pageid/components/component-id"))
            .and(header("Authorization", "OAuth apikey"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "component-id",
                "name": "Website",
                "status": "operational"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let component = client_for(&server)
            .await
            .get_component("component-id")
            .await
            .unwrap();

        assert_eq!(component.id, "component-id");
        assert_eq!(component.status, "operational");
        assert_eq!(component.name.as_deref(), Some("Website"));
    }

    #[tokio::test]
    async fn test_get_component_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pages/pageid/components/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("{\"error\":\"not found\"}"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .get_component("missing")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pages/pageid/incidents/unresolved"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .get_unresolved_incidents()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 500, ref message } if message == "boom"));
    }

    #[tokio::test]
    async fn test_client_error_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pages/pageid/incidents"))
            .respond_with(ResponseTemplate::new(422).set_body_string("name is required"))
            .mount(&server)
            .await;

        let payload = CreateIncidentRequest::investigating(
            "c1",
            ComponentStatus::MajorOutage,
            &Incident::default(),
        );
        let err = client_for(&server)
            .await
            .create_incident(&payload)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Api { status: 422, .. }));
        assert_eq!(err.to_string(), "API error 422: name is required");
    }

    #[tokio::test]
    async fn test_unparseable_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pages/pageid/components/c"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_component("c").await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[tokio::test]
    async fn test_network_failure() {
        let config = StatusPageClientConfig::new("k", "p")
            .with_base_url("http://127.0.0.1:9/pages")
            .with_timeout(Duration::from_millis(500));
        let client = StatusPageClient::with_config(config).unwrap();

        let err = client.get_component("c").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[tokio::test]
    async fn test_update_component_payload() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/pages/pageid/components/c1"))
            .and(body_json(serde_json::json!({"component": {"status": "major_outage"}})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "c1", "status": "major_outage"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let component = client_for(&server)
            .await
            .update_component("c1", ComponentStatus::MajorOutage)
            .await
            .unwrap();
        assert_eq!(component.status, "major_outage");
    }

    #[tokio::test]
    async fn test_incident_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pages/pageid/incidents/unresolved"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "i1", "components": [{"id": "c1"}]},
                {"id": "i2", "components": []}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/pages/pageid/incidents"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"id": "i3", "status": "investigating"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/pages/pageid/incidents/i1"))
            .and(body_json(serde_json::json!({"incident": {"status": "resolved"}})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "i1", "status": "resolved"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;

        let incidents = client.get_unresolved_incidents().await.unwrap();
        assert_eq!(incidents.len(), 2);
        assert!(incidents[0].affects("c1"));

        let payload = CreateIncidentRequest::investigating(
            "c1",
            ComponentStatus::MajorOutage,
            &Incident::new("Website", "Major Service Outage"),
        );
        let created = client.create_incident(&payload).await.unwrap();
        assert_eq!(created.id, "i3");

        let resolved = client
            .update_incident("i1", &IncidentUpdateRequest::resolve())
            .await
            .unwrap();
        assert_eq!(resolved.status.as_deref(), Some("resolved"));
    }
}
