//! Health check execution
//!
//! One check cycle per target: probe, then (when configured) reconcile
//! the status page, then notify at most once. Targets are independent and
//! run concurrently on a bounded pool.

mod probe;

pub use probe::*;

use futures::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{HealthCheckSettings, MonitorSettings};
use crate::contracts::*;
use crate::engine::StatusSyncEngine;
use crate::error::Result;
use crate::notify::{EmailNotifier, Notifier};
use crate::telemetry::MonitorMetrics;

/// Runs check cycles for individual targets
pub struct HealthCheckExecutor {
    probe: HttpProbe,
    sync: Option<StatusSyncEngine>,
    notifier: Arc<dyn Notifier>,
    metrics: Option<Arc<MonitorMetrics>>,
}

impl HealthCheckExecutor {
    /// Create an executor; without a sync engine checks are probe-only
    pub fn new(probe: HttpProbe, sync: Option<StatusSyncEngine>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            probe,
            sync,
            notifier,
            metrics: None,
        }
    }

    /// Build the probe, sync engine and email notifier from settings
    pub fn from_settings(settings: &MonitorSettings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.request_timeout_secs);

        let sync = if settings.status_page.is_configured() {
            Some(StatusSyncEngine::from_settings(&settings.status_page, timeout)?)
        } else {
            tracing::info!("Status page not configured, running probe-only checks");
            None
        };

        let notifier = EmailNotifier::new(settings.notification.clone(), timeout)?;
        Ok(Self::new(HttpProbe::new(timeout)?, sync, Arc::new(notifier)))
    }

    /// Record metrics for every check, including status page errors
    pub fn with_metrics(mut self, metrics: Arc<MonitorMetrics>) -> Self {
        self.sync = self.sync.map(|engine| engine.with_metrics(metrics.clone()));
        self.metrics = Some(metrics);
        self
    }

    pub fn has_status_page(&self) -> bool {
        self.sync.is_some()
    }

    /// Run one check cycle for `target`.
    ///
    /// A failed probe notifies with the probe message. When the target is
    /// synced to a status page the sync result decides instead: notify
    /// only if an incident was opened or resolved, with the incident
    /// description as body.
    pub async fn execute_health_check(&self, target: &HealthCheckSettings) -> Result<CheckOutcome> {
        let span = tracing::info_span!("check", target = %target.name);
        self.run_check(target).instrument(span).await
    }

    async fn run_check(&self, target: &HealthCheckSettings) -> Result<CheckOutcome> {
        tracing::info!("Checking {}...", target.name);

        let start = Instant::now();
        let probe = self.probe.get(&target.url).await;
        let elapsed = start.elapsed();

        let (level, mut send_notification, mut notification_text) = if probe.success {
            tracing::info!("Status OK");
            (OperationalLevel::Operational, false, String::new())
        } else {
            tracing::warn!("{}", probe.message);
            (OperationalLevel::FullOutage, true, probe.message.clone())
        };

        let mut sync = None;
        if let (Some(engine), Some(component_id)) = (&self.sync, target.component_id()) {
            let result = engine
                .update_component_status(component_id, level, Incident::for_level(&target.name, level))
                .await?;

            send_notification = result.incident_changed();
            notification_text = result.incident_description().to_string();
            sync = Some(result);
        }

        let mut notified = false;
        if send_notification {
            tracing::info!("Sending notification: {}", notification_text);
            let delivered = match self.notifier.notify(&target.name, &notification_text).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(notifier = self.notifier.id(), error = %e, "Failed to send notification");
                    false
                }
            };
            if let Some(metrics) = &self.metrics {
                metrics.record_notification(delivered);
            }
            notified = true;
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_check(&target.name, level, elapsed.as_secs_f64());
            if let Some(result) = &sync {
                if result.incident_created {
                    metrics.record_incident_created();
                }
                if result.incident_resolved {
                    metrics.record_incident_resolved();
                }
            }
        }

        Ok(CheckOutcome {
            name: target.name.clone(),
            level,
            message: probe.message,
            sync,
            notified,
            duration_ms: elapsed.as_millis() as u64,
            checked_at: chrono::Utc::now(),
        })
    }
}

/// Check every target, at most `concurrency` at a time.
///
/// Outcomes come back in completion order. Remote failures never stop
/// the batch; only a contract violation (invalid status) is returned as
/// an error, after every check has finished.
pub async fn run_health_checks(
    executor: &HealthCheckExecutor,
    targets: &[HealthCheckSettings],
    concurrency: usize,
) -> Result<Vec<CheckOutcome>> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("run", run_id = %run_id, targets = targets.len());

    let results: Vec<Result<CheckOutcome>> = futures::stream::iter(targets)
        .map(|target| executor.execute_health_check(target))
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .instrument(span)
        .await;

    results.into_iter().collect()
}
