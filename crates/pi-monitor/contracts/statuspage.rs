//! statuspage.io vocabularies and wire types
//!
//! Request payloads and the read-only projections of remote components
//! and incidents. See <https://developer.statuspage.io/>.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::Incident;
use crate::error::MonitorError;

/// Canonical component status names, in the order the API documents them
pub const COMPONENT_STATUSES: [&str; 5] = [
    "operational",
    "under_maintenance",
    "degraded_performance",
    "partial_outage",
    "major_outage",
];

/// Canonical live incident status names
pub const INCIDENT_STATUSES: [&str; 4] = ["investigating", "identified", "monitoring", "resolved"];

/// Canonical scheduled incident status names
pub const SCHEDULED_INCIDENT_STATUSES: [&str; 4] =
    ["scheduled", "in_progress", "verifying", "complete"];

/// Status of a status page component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Operational,
    UnderMaintenance,
    DegradedPerformance,
    PartialOutage,
    MajorOutage,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Operational => "operational",
            ComponentStatus::UnderMaintenance => "under_maintenance",
            ComponentStatus::DegradedPerformance => "degraded_performance",
            ComponentStatus::PartialOutage => "partial_outage",
            ComponentStatus::MajorOutage => "major_outage",
        }
    }
}

impl FromStr for ComponentStatus {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operational" => Ok(ComponentStatus::Operational),
            "under_maintenance" => Ok(ComponentStatus::UnderMaintenance),
            "degraded_performance" => Ok(ComponentStatus::DegradedPerformance),
            "partial_outage" => Ok(ComponentStatus::PartialOutage),
            "major_outage" => Ok(ComponentStatus::MajorOutage),
            other => Err(MonitorError::invalid_status(other, &COMPONENT_STATUSES)),
        }
    }
}

impl std::fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a live (unscheduled) incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Investigating,
    Identified,
    Monitoring,
    Resolved,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Investigating => "investigating",
            IncidentStatus::Identified => "identified",
            IncidentStatus::Monitoring => "monitoring",
            IncidentStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for IncidentStatus {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "investigating" => Ok(IncidentStatus::Investigating),
            "identified" => Ok(IncidentStatus::Identified),
            "monitoring" => Ok(IncidentStatus::Monitoring),
            "resolved" => Ok(IncidentStatus::Resolved),
            other => Err(MonitorError::invalid_status(other, &INCIDENT_STATUSES)),
        }
    }
}

/// Status of a scheduled maintenance incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledIncidentStatus {
    Scheduled,
    InProgress,
    Verifying,
    Complete,
}

impl FromStr for ScheduledIncidentStatus {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(ScheduledIncidentStatus::Scheduled),
            "in_progress" => Ok(ScheduledIncidentStatus::InProgress),
            "verifying" => Ok(ScheduledIncidentStatus::Verifying),
            "complete" => Ok(ScheduledIncidentStatus::Complete),
            other => Err(MonitorError::invalid_status(other, &SCHEDULED_INCIDENT_STATUSES)),
        }
    }
}

/// A component as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteComponent {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Raw status string; kept untyped so unexpected values still parse
    pub status: String,
}

impl RemoteComponent {
    pub fn is_under_maintenance(&self) -> bool {
        self.status == ComponentStatus::UnderMaintenance.as_str()
    }
}

/// Reference to a component inside an incident
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentComponent {
    pub id: String,
}

/// Projection of a remote incident, used for membership tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentSummary {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default)]
    pub components: Vec<IncidentComponent>,
}

impl IncidentSummary {
    /// Whether the incident lists the given component
    pub fn affects(&self, component_id: &str) -> bool {
        self.components.iter().any(|c| c.id == component_id)
    }
}

/// `PUT components/{id}` body
#[derive(Debug, Clone, Serialize)]
pub struct ComponentUpdateRequest {
    pub component: ComponentUpdate,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentUpdate {
    pub status: ComponentStatus,
}

impl ComponentUpdateRequest {
    pub fn new(status: ComponentStatus) -> Self {
        Self {
            component: ComponentUpdate { status },
        }
    }
}

/// `PATCH incidents/{id}` body
#[derive(Debug, Clone, Serialize)]
pub struct IncidentUpdateRequest {
    pub incident: IncidentUpdate,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncidentUpdate {
    pub status: IncidentStatus,
}

impl IncidentUpdateRequest {
    pub fn resolve() -> Self {
        Self {
            incident: IncidentUpdate {
                status: IncidentStatus::Resolved,
            },
        }
    }
}

/// `POST incidents` body
#[derive(Debug, Clone, Serialize)]
pub struct CreateIncidentRequest {
    pub incident: NewIncident,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewIncident {
    pub name: String,
    pub status: IncidentStatus,
    pub body: String,
    pub component_ids: Vec<String>,
    pub components: BTreeMap<String, ComponentStatus>,
}

impl CreateIncidentRequest {
    /// New `investigating` incident attached to one component
    pub fn investigating(component_id: &str, status: ComponentStatus, details: &Incident) -> Self {
        let mut components = BTreeMap::new();
        components.insert(component_id.to_string(), status);

        Self {
            incident: NewIncident {
                name: details.name.clone(),
                status: IncidentStatus::Investigating,
                body: details.description.clone(),
                component_ids: vec![component_id.to_string()],
                components,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_component_status_round_trips_vocabulary() {
        for name in COMPONENT_STATUSES {
            let status: ComponentStatus = name.parse().unwrap();
            assert_eq!(status.as_str(), name);
        }
    }

    #[test]
    fn test_invalid_component_status() {
        let err = "broken".parse::<ComponentStatus>().unwrap_err();
        assert!(matches!(err, MonitorError::InvalidStatus { ref value, .. } if value == "broken"));
        assert!(err.to_string().contains("Invalid status 'broken'"));
    }

    #[test]
    fn test_incident_status_vocabulary() {
        for name in INCIDENT_STATUSES {
            let status: IncidentStatus = name.parse().unwrap();
            assert_eq!(status.as_str(), name);
        }
        assert!("complete".parse::<IncidentStatus>().is_err());
        assert!("complete".parse::<ScheduledIncidentStatus>().is_ok());
    }

    #[test]
    fn test_create_incident_payload() {
        let details = Incident::new("Website", "Major Service Outage");
        let payload =
            CreateIncidentRequest::investigating("comp-1", ComponentStatus::MajorOutage, &details);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "incident": {
                    "name": "Website",
                    "status": "investigating",
                    "body": "Major Service Outage",
                    "component_ids": ["comp-1"],
                    "components": {"comp-1": "major_outage"}
                }
            })
        );
    }

    #[test]
    fn test_update_payloads() {
        let json = serde_json::to_value(ComponentUpdateRequest::new(ComponentStatus::Operational))
            .unwrap();
        assert_eq!(json, serde_json::json!({"component": {"status": "operational"}}));

        let json = serde_json::to_value(IncidentUpdateRequest::resolve()).unwrap();
        assert_eq!(json, serde_json::json!({"incident": {"status": "resolved"}}));
    }

    #[test]
    fn test_incident_membership() {
        let incident: IncidentSummary = serde_json::from_value(serde_json::json!({
            "id": "incident-id",
            "name": "Outage",
            "status": "investigating",
            "components": [{"id": "component-id"}, {"id": "component-id-2", "name": "other"}]
        }))
        .unwrap();

        assert!(incident.affects("component-id"));
        assert!(incident.affects("component-id-2"));
        assert!(!incident.affects("component-id-3"));
        assert_eq!(incident.components.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_unknown_component_status_rejected(s in "[a-z_]{0,24}") {
            prop_assume!(!COMPONENT_STATUSES.contains(&s.as_str()));
            let is_invalid = matches!(
                s.parse::<ComponentStatus>(),
                Err(MonitorError::InvalidStatus { .. })
            );
            prop_assert!(is_invalid);
        }
    }
}
