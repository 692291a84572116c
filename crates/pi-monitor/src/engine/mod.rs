//! Status synchronization engine
//!
//! Reconciles a locally observed operational level with the component
//! status and open incidents on statuspage.io.
//!
//! Every decision is recomputed from a fresh remote read; nothing is
//! remembered between calls. Remote failures are absorbed step by step:
//! a failed read means "leave the remote state alone", a failed write is
//! logged and the remaining steps still run. Only an out-of-vocabulary
//! status is reported as an error.
//!
//! Two syncs racing on the same component id can interleave, since the
//! read-modify-write below is not atomic.

use std::sync::Arc;
use std::time::Duration;

use crate::client::{StatusPageClient, StatusPageClientConfig};
use crate::config::StatusPageSettings;
use crate::contracts::*;
use crate::error::Result;
use crate::telemetry::MonitorMetrics;

/// Validate a component status name against the canonical vocabulary
pub fn validate_status(status: &str) -> Result<ComponentStatus> {
    status.parse()
}

/// Keeps status page components in line with observed health
#[derive(Clone)]
pub struct StatusSyncEngine {
    client: StatusPageClient,
    metrics: Option<Arc<MonitorMetrics>>,
}

impl StatusSyncEngine {
    pub fn new(client: StatusPageClient) -> Self {
        Self {
            client,
            metrics: None,
        }
    }

    /// Build an engine with its own client from settings
    pub fn from_settings(settings: &StatusPageSettings, timeout: Duration) -> Result<Self> {
        let config = StatusPageClientConfig::from_settings(settings, timeout);
        Ok(Self::new(StatusPageClient::with_config(config)?))
    }

    /// Count failed API calls on the given metrics
    pub fn with_metrics(mut self, metrics: Arc<MonitorMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Component status a level should be shown as
    pub fn target_status(level: OperationalLevel) -> Result<ComponentStatus> {
        validate_status(level.component_status_name())
    }

    /// Bring a component in line with `level`.
    ///
    /// When the component changes to `operational`, open incidents that
    /// list it are resolved. When it changes to `major_outage` and no
    /// incident lists it, one is opened from `incident_details`.
    /// Components under maintenance are never touched.
    pub async fn update_component_status(
        &self,
        component_id: &str,
        level: OperationalLevel,
        incident_details: Incident,
    ) -> Result<SyncResult> {
        let target = Self::target_status(level)?;

        let component = match self.client.get_component(component_id).await {
            Ok(component) => component,
            Err(e) => {
                self.record_error("get_component");
                tracing::warn!(
                    component_id,
                    error = %e,
                    "Unable to read component status, leaving it unchanged"
                );
                return Ok(SyncResult::unchanged(incident_details));
            }
        };

        if component.status == target.as_str() || component.is_under_maintenance() {
            tracing::debug!(
                component_id,
                status = %component.status,
                "Component status unchanged"
            );
            return Ok(SyncResult::unchanged(incident_details));
        }

        tracing::info!("Changing status from {} to {}", component.status, target);
        let mut result = SyncResult {
            status_changed: true,
            ..SyncResult::unchanged(incident_details)
        };

        // Carry on with incidents even when the write fails.
        if let Err(e) = self.client.update_component(component_id, target).await {
            self.record_error("update_component");
            tracing::warn!(component_id, error = %e, "Failed to update component");
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_status_change(component_id, target.as_str());
        }

        self.reconcile_incidents(component_id, target, &mut result)
            .await;

        Ok(result)
    }

    /// Open or close incidents after a status change
    async fn reconcile_incidents(
        &self,
        component_id: &str,
        target: ComponentStatus,
        result: &mut SyncResult,
    ) {
        let associated = match self.associated_incidents(component_id).await {
            Some(incidents) => incidents,
            None => return,
        };
        tracing::info!(
            "Associated Incidents for {}: {}",
            component_id,
            associated.len()
        );

        match target {
            ComponentStatus::Operational if !associated.is_empty() => {
                for incident in &associated {
                    self.close_incident(&incident.id).await;
                    result.incident_resolved = true;
                }
            }
            ComponentStatus::MajorOutage if associated.is_empty() => {
                self.create_incident(component_id, target, &result.incident)
                    .await;
                result.incident_created = true;
            }
            _ => {}
        }
    }

    /// Unresolved incidents listing the component, `None` if unknown
    async fn associated_incidents(&self, component_id: &str) -> Option<Vec<IncidentSummary>> {
        match self.client.get_unresolved_incidents().await {
            Ok(incidents) => Some(
                incidents
                    .into_iter()
                    .filter(|incident| incident.affects(component_id))
                    .collect(),
            ),
            Err(e) => {
                self.record_error("get_unresolved_incidents");
                tracing::warn!(
                    component_id,
                    error = %e,
                    "Failed to list unresolved incidents, skipping incident update"
                );
                None
            }
        }
    }

    async fn close_incident(&self, incident_id: &str) {
        tracing::info!("Closing incident {}", incident_id);
        if let Err(e) = self
            .client
            .update_incident(incident_id, &IncidentUpdateRequest::resolve())
            .await
        {
            self.record_error("update_incident");
            tracing::warn!(incident_id, error = %e, "Failed to resolve incident");
        }
    }

    async fn create_incident(&self, component_id: &str, status: ComponentStatus, details: &Incident) {
        tracing::info!(
            "Creating incident: Component {} - New Component Status {}",
            component_id,
            status
        );
        let payload = CreateIncidentRequest::investigating(component_id, status, details);
        if let Err(e) = self.client.create_incident(&payload).await {
            self.record_error("create_incident");
            tracing::warn!(component_id, error = %e, "Failed to create incident");
        }
    }

    fn record_error(&self, operation: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_statuspage_error(operation);
        }
    }
}
