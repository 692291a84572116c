//! Pi Monitor
//!
//! Probes HTTP endpoints and keeps a statuspage.io page in step with what
//! it sees: component status follows the probe, an incident is opened when
//! a component goes down and resolved when it comes back, and a
//! notification goes out whenever an incident is opened or resolved.
//!
//! ## Architecture
//!
//! 1. **Contracts** (`contracts/`): operational levels, incidents, sync
//!    results and the statuspage.io wire types.
//!
//! 2. **Config** (`config`): the monitor configuration file.
//!
//! 3. **Client** (`client/`): statuspage.io REST client.
//!
//! 4. **Engine** (`engine/`): component status and incident
//!    reconciliation for a single component.
//!
//! 5. **Health checks** (`healthcheck/`): probe, sync and notify for each
//!    target, run on a bounded pool.
//!
//! 6. **Notify** (`notify/`): notification delivery.
//!
//! 7. **Telemetry** (`telemetry/`): logging setup and Prometheus metrics.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Check every target in monitor.config.json
//! pi-monitor
//!
//! # Another configuration file, JSON summary, metrics for node-exporter
//! pi-monitor run -c /etc/pi-monitor/config.yaml --format json --metrics-file /var/lib/node_exporter/pi_monitor.prom
//!
//! # Check a configuration file without contacting anything
//! pi-monitor validate -c monitor.config.json
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use pi_monitor::{OperationalLevel, Incident, StatusSyncEngine, StatusPageClient};
//!
//! #[tokio::main]
//! async fn main() -> pi_monitor::error::Result<()> {
//!     let engine = StatusSyncEngine::new(StatusPageClient::new("api-key", "page-id")?);
//!     let result = engine
//!         .update_component_status(
//!             "component-id",
//!             OperationalLevel::FullOutage,
//!             Incident::for_level("Website", OperationalLevel::FullOutage),
//!         )
//!         .await?;
//!     println!("incident opened: {}", result.incident_created);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod healthcheck;
pub mod notify;
pub mod telemetry;

// Contracts module - located at ../contracts relative to src/
#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use contracts::{
    CheckOutcome, ComponentStatus, CreateIncidentRequest, Incident, IncidentStatus,
    IncidentSummary, OperationalLevel, RemoteComponent, ScheduledIncidentStatus, SyncResult,
};

pub use cli::{ExitCode, MonitorCli, MonitorCommands, OutputFormat};
pub use client::{ClientError, StatusPageClient, StatusPageClientConfig};
pub use config::{
    read_configuration, HealthCheckSettings, MonitorSettings, NotificationSettings,
    StatusPageSettings,
};
pub use engine::{validate_status, StatusSyncEngine};
pub use error::MonitorError;
pub use healthcheck::{run_health_checks, HealthCheckExecutor, HttpProbe, ProbeResult};
pub use notify::{EmailNotifier, Notifier, NotifyError};
pub use telemetry::{LogFormat, MonitorMetrics};

/// Run the CLI application and map errors to exit codes
pub async fn run_cli(cli: MonitorCli) -> ExitCode {
    match cli::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "pi-monitor failed");
            eprintln!("Error: {}", e);
            ExitCode::from_error(&e)
        }
    }
}
