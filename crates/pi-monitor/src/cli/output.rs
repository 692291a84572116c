//! Output formatting for the Pi Monitor CLI
//!
//! Run and validation summaries in JSON, YAML, or a colored table.

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::config::MonitorSettings;
use crate::contracts::CheckOutcome;
use crate::error::{MonitorError, Result};

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

fn render_serialized<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| MonitorError::Serialization(e.to_string()))?,
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| MonitorError::Serialization(e.to_string()))?,
        OutputFormat::Table => return Ok(false),
    };
    println!("{}", text);
    Ok(true)
}

/// Summary of one monitoring run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub up: usize,
    pub down: usize,
    pub status_changes: usize,
    pub incidents_created: usize,
    pub incidents_resolved: usize,
    pub notifications: usize,
    pub targets: Vec<CheckOutcome>,
}

impl RunReport {
    /// Summarise outcomes, sorted by target name
    pub fn from_outcomes(mut outcomes: Vec<CheckOutcome>) -> Self {
        outcomes.sort_by(|a, b| a.name.cmp(&b.name));

        let up = outcomes.iter().filter(|o| o.is_operational()).count();
        let synced = || outcomes.iter().filter_map(|o| o.sync.as_ref());

        Self {
            up,
            down: outcomes.len() - up,
            status_changes: synced().filter(|s| s.status_changed).count(),
            incidents_created: synced().filter(|s| s.incident_created).count(),
            incidents_resolved: synced().filter(|s| s.incident_resolved).count(),
            notifications: outcomes.iter().filter(|o| o.notified).count(),
            targets: outcomes,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} target(s) checked: {} up, {} down",
            self.targets.len(),
            self.up,
            self.down
        )
    }

    pub fn render(&self, format: OutputFormat) -> Result<()> {
        if render_serialized(self, format)? {
            return Ok(());
        }
        self.render_table();
        Ok(())
    }

    fn render_table(&self) {
        let mut stdout = io::stdout();

        writeln!(stdout).ok();
        writeln!(stdout, "{}", "Health Check Results".cyan().bold()).ok();
        writeln!(stdout, "{}", "=".repeat(60)).ok();

        for outcome in &self.targets {
            let status = if outcome.is_operational() {
                "UP".green().bold()
            } else {
                "DOWN".red().bold()
            };
            writeln!(
                stdout,
                "{:<6} {} {}",
                status,
                outcome.name,
                format!("({} ms)", outcome.duration_ms).dimmed()
            )
            .ok();

            if !outcome.message.is_empty() {
                writeln!(stdout, "  {} {}", "Reason:".dimmed(), outcome.message).ok();
            }
            if let Some(sync) = &outcome.sync {
                let mut actions = Vec::new();
                if sync.status_changed {
                    actions.push("status changed");
                }
                if sync.incident_created {
                    actions.push("incident opened");
                }
                if sync.incident_resolved {
                    actions.push("incidents resolved");
                }
                let text = if actions.is_empty() {
                    "unchanged".to_string()
                } else {
                    actions.join(", ")
                };
                writeln!(stdout, "  {} {}", "Status page:".dimmed(), text.cyan()).ok();
            }
            if outcome.notified {
                writeln!(stdout, "  {} {}", "!".yellow(), "notification sent".yellow()).ok();
            }
        }

        writeln!(stdout, "{}", "-".repeat(60)).ok();
        let summary = if self.down == 0 {
            self.summary().green()
        } else {
            self.summary().red()
        };
        writeln!(stdout, "{}", summary).ok();
        stdout.flush().ok();
    }
}

/// Target as shown by `validate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSummary {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
}

/// Result of loading and validating a configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigReport {
    pub config: String,
    pub status_page_enabled: bool,
    pub notification_enabled: bool,
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    /// Targets with a status page component
    pub synced_targets: usize,
    pub targets: Vec<TargetSummary>,
}

impl ConfigReport {
    pub fn new(config: impl Into<String>, settings: &MonitorSettings) -> Self {
        Self {
            config: config.into(),
            status_page_enabled: settings.status_page.is_configured(),
            notification_enabled: settings.notification.is_enabled(),
            concurrency: settings.concurrency,
            request_timeout_secs: settings.request_timeout_secs,
            synced_targets: settings.synced_checks().count(),
            targets: settings
                .status_checks
                .iter()
                .map(|c| TargetSummary {
                    name: c.name.clone(),
                    url: c.url.clone(),
                    component_id: c.component_id().map(str::to_string),
                })
                .collect(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<()> {
        if render_serialized(self, format)? {
            return Ok(());
        }

        let mut stdout = io::stdout();
        let flag = |enabled: bool| if enabled { "enabled".green() } else { "disabled".yellow() };

        writeln!(stdout).ok();
        writeln!(stdout, "{} {}", "Configuration:".cyan().bold(), self.config).ok();
        writeln!(stdout, "{}", "=".repeat(60)).ok();
        writeln!(stdout, "  Status page:   {}", flag(self.status_page_enabled)).ok();
        writeln!(stdout, "  Notifications: {}", flag(self.notification_enabled)).ok();
        writeln!(stdout, "  Concurrency:   {}", self.concurrency).ok();
        writeln!(stdout, "  Timeout:       {}s", self.request_timeout_secs).ok();
        writeln!(
            stdout,
            "  Synced:        {} of {} target(s)",
            self.synced_targets,
            self.targets.len()
        )
        .ok();
        writeln!(stdout).ok();
        writeln!(stdout, "{}", "Targets:".cyan().bold()).ok();
        for target in &self.targets {
            let url = if target.url.is_empty() {
                "(no url)".red()
            } else {
                target.url.normal()
            };
            match &target.component_id {
                Some(id) => writeln!(stdout, "  {} {} -> {}", target.name, url, id.cyan()).ok(),
                None => writeln!(stdout, "  {} {}", target.name, url).ok(),
            };
        }
        stdout.flush().ok();
        Ok(())
    }
}
