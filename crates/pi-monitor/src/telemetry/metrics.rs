//! Prometheus metrics for Pi Monitor
//!
//! - `pi_monitor_checks_total` (counter) - Check cycles by target and result
//! - `pi_monitor_probe_duration_seconds` (histogram) - Probe latency by target
//! - `pi_monitor_status_changes_total` (counter) - Component status writes
//! - `pi_monitor_incidents_created_total` / `pi_monitor_incidents_resolved_total`
//! - `pi_monitor_notifications_total` (counter) - Notifications by outcome
//! - `pi_monitor_statuspage_errors_total` (counter) - Failed API calls by operation
//!
//! A run is a single short-lived pass, so metrics are written out once at
//! the end (see [`MonitorMetrics::gather_text`]) rather than served.

use prometheus::{
    Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

use crate::contracts::OperationalLevel;
use crate::error::{MonitorError, Result};

const NAMESPACE: &str = "pi_monitor";

/// Metrics recorded during a run
pub struct MonitorMetrics {
    registry: Registry,
    checks_total: CounterVec,
    probe_duration_seconds: HistogramVec,
    status_changes_total: CounterVec,
    incidents_created_total: Counter,
    incidents_resolved_total: Counter,
    notifications_total: CounterVec,
    statuspage_errors_total: CounterVec,
}

impl MonitorMetrics {
    /// Create metrics registered on a fresh registry
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let checks_total = CounterVec::new(
            Opts::new("checks_total", "Total number of health check cycles")
                .namespace(NAMESPACE),
            &["target", "result"],
        )?;

        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new("probe_duration_seconds", "HTTP probe duration in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["target"],
        )?;

        let status_changes_total = CounterVec::new(
            Opts::new(
                "status_changes_total",
                "Total number of component status writes issued",
            )
            .namespace(NAMESPACE),
            &["component_id", "status"],
        )?;

        let incidents_created_total = Counter::with_opts(
            Opts::new("incidents_created_total", "Total number of incidents opened")
                .namespace(NAMESPACE),
        )?;

        let incidents_resolved_total = Counter::with_opts(
            Opts::new(
                "incidents_resolved_total",
                "Total number of syncs that resolved incidents",
            )
            .namespace(NAMESPACE),
        )?;

        let notifications_total = CounterVec::new(
            Opts::new("notifications_total", "Total number of notifications attempted")
                .namespace(NAMESPACE),
            &["outcome"],
        )?;

        let statuspage_errors_total = CounterVec::new(
            Opts::new(
                "statuspage_errors_total",
                "Total number of failed statuspage.io API calls",
            )
            .namespace(NAMESPACE),
            &["operation"],
        )?;

        registry.register(Box::new(checks_total.clone()))?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;
        registry.register(Box::new(status_changes_total.clone()))?;
        registry.register(Box::new(incidents_created_total.clone()))?;
        registry.register(Box::new(incidents_resolved_total.clone()))?;
        registry.register(Box::new(notifications_total.clone()))?;
        registry.register(Box::new(statuspage_errors_total.clone()))?;

        Ok(Self {
            registry,
            checks_total,
            probe_duration_seconds,
            status_changes_total,
            incidents_created_total,
            incidents_resolved_total,
            notifications_total,
            statuspage_errors_total,
        })
    }

    /// Record a completed check cycle
    pub fn record_check(&self, target: &str, level: OperationalLevel, duration_secs: f64) {
        let result = if level.is_operational() { "up" } else { "down" };
        self.checks_total.with_label_values(&[target, result]).inc();
        self.probe_duration_seconds
            .with_label_values(&[target])
            .observe(duration_secs);
    }

    pub fn record_status_change(&self, component_id: &str, status: &str) {
        self.status_changes_total
            .with_label_values(&[component_id, status])
            .inc();
    }

    pub fn record_incident_created(&self) {
        self.incidents_created_total.inc();
    }

    pub fn record_incident_resolved(&self) {
        self.incidents_resolved_total.inc();
    }

    pub fn record_notification(&self, delivered: bool) {
        let outcome = if delivered { "sent" } else { "failed" };
        self.notifications_total.with_label_values(&[outcome]).inc();
    }

    /// Record a failed statuspage.io call
    pub fn record_statuspage_error(&self, operation: &str) {
        self.statuspage_errors_total
            .with_label_values(&[operation])
            .inc();
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| MonitorError::Serialization(e.to_string()))
    }
}
