//! Configuration loading
//!
//! Reads the monitor configuration (`monitor.config.json` by default) into
//! typed settings. JSON, YAML and TOML are accepted, chosen by file
//! extension. Both snake_case and the older camelCase keys are understood.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{MonitorError, Result};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "monitor.config.json";

/// Default statuspage.io API base
pub const DEFAULT_STATUS_PAGE_BASE_URL: &str = "https://api.statuspage.io/v1/pages";

/// Status page settings for a single target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPageComponentSettings {
    /// Id of the component on the status page
    #[serde(default, alias = "componentId")]
    pub component_id: String,
}

/// A monitored HTTP endpoint.
///
/// The target is considered down when the request fails or returns
/// anything other than 200.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckSettings {
    /// Target name, unique across the configuration
    pub name: String,

    /// URL fetched by the probe
    #[serde(default)]
    pub url: String,

    /// Status page component to keep in sync
    #[serde(default, alias = "statusPage", skip_serializing_if = "Option::is_none")]
    pub status_page: Option<StatusPageComponentSettings>,
}

impl HealthCheckSettings {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            status_page: None,
        }
    }

    /// Attach a status page component
    pub fn with_component(mut self, component_id: impl Into<String>) -> Self {
        self.status_page = Some(StatusPageComponentSettings {
            component_id: component_id.into(),
        });
        self
    }

    /// Component id, if one is configured and non-empty
    pub fn component_id(&self) -> Option<&str> {
        self.status_page
            .as_ref()
            .map(|s| s.component_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// statuspage.io credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPageSettings {
    #[serde(default, alias = "apiKey")]
    pub api_key: String,

    #[serde(default, alias = "pageId")]
    pub page_id: String,

    /// API base, overridable for proxies and tests
    #[serde(default = "default_base_url", alias = "baseUrl")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_STATUS_PAGE_BASE_URL.to_string()
}

impl Default for StatusPageSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            page_id: String::new(),
            base_url: default_base_url(),
        }
    }
}

impl StatusPageSettings {
    /// Whether the status page integration should be used
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.page_id.is_empty()
    }
}

/// Email notification settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Mail API host; an http(s) URL here replaces the default API base
    #[serde(default, alias = "smtpUrl", alias = "smtp_host")]
    pub smtp_url: String,

    #[serde(default, alias = "smtpPort")]
    pub smtp_port: u16,

    /// Sender address
    #[serde(default, alias = "smtpSenderId")]
    pub smtp_sender_id: String,

    /// Sender API key
    #[serde(default, alias = "smtpSenderApikey", alias = "smtp_sender_secret")]
    pub smtp_sender_apikey: String,

    /// Recipient address; notifications are disabled when empty
    #[serde(default, alias = "smsEmail", alias = "notify_email")]
    pub sms_email: String,
}

impl NotificationSettings {
    pub fn is_enabled(&self) -> bool {
        !self.sms_email.is_empty()
    }
}

/// The whole configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSettings {
    #[serde(default, alias = "statusChecks")]
    pub status_checks: Vec<HealthCheckSettings>,

    #[serde(default)]
    pub notification: NotificationSettings,

    #[serde(default, alias = "statusPage")]
    pub status_page: StatusPageSettings,

    /// Per-request timeout for every HTTP call
    #[serde(default = "default_timeout_secs", alias = "requestTimeoutSecs")]
    pub request_timeout_secs: u64,

    /// Number of targets checked at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_concurrency() -> usize {
    4
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            status_checks: Vec::new(),
            notification: NotificationSettings::default(),
            status_page: StatusPageSettings::default(),
            request_timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
        }
    }
}

impl MonitorSettings {
    /// Parse settings from text in the given format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let settings: MonitorSettings = match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        settings.validate()
    }

    /// Check target names and normalise optional values.
    ///
    /// Target names must be non-empty and unique. Blank component ids
    /// are treated as absent.
    pub fn validate(mut self) -> Result<Self> {
        if self.concurrency == 0 {
            return Err(MonitorError::config("concurrency must be at least 1"));
        }

        let mut seen = HashSet::new();
        for check in &mut self.status_checks {
            check.name = check.name.trim().to_string();
            if check.name.is_empty() {
                return Err(MonitorError::config("status check with an empty name"));
            }
            if !seen.insert(check.name.clone()) {
                return Err(MonitorError::config(format!(
                    "duplicate status check name: {}",
                    check.name
                )));
            }

            if let Some(component) = &mut check.status_page {
                component.component_id = component.component_id.trim().to_string();
            }
            if check.component_id().is_none() {
                check.status_page = None;
            }
        }

        Ok(self)
    }

    /// Targets that will update a status page component
    pub fn synced_checks(&self) -> impl Iterator<Item = &HealthCheckSettings> {
        self.status_checks
            .iter()
            .filter(|c| c.component_id().is_some())
    }
}

/// Configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick a format from the file extension, JSON when unknown
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Read the configuration file.
///
/// A missing file is not an error: it is logged and `defaults` is
/// returned. A file that exists but cannot be parsed or validated is.
pub fn read_configuration(file: impl AsRef<Path>, defaults: MonitorSettings) -> Result<MonitorSettings> {
    let path = file.as_ref();

    if !path.exists() {
        tracing::error!(
            "Configuration file not found: {}.  Using default",
            path.display()
        );
        return Ok(defaults);
    }

    tracing::info!(path = %path.display(), "Reading configuration file");
    let content = std::fs::read_to_string(path)?;
    MonitorSettings::parse(&content, ConfigFormat::from_path(path))
}
