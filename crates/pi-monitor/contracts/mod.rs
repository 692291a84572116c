//! Pi Monitor Contracts
//!
//! Plain data shared by the probe, the status synchronization engine and
//! the notifier. Nothing here performs I/O.

pub mod statuspage;

pub use statuspage::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local classification of a target's health.
///
/// Ordered from healthiest to least healthy. Only `Operational` versus
/// everything else drives the remote component status today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalLevel {
    Operational,
    Degraded,
    PartialOutage,
    FullOutage,
}

impl OperationalLevel {
    /// All levels, healthiest first
    pub const ALL: [OperationalLevel; 4] = [
        OperationalLevel::Operational,
        OperationalLevel::Degraded,
        OperationalLevel::PartialOutage,
        OperationalLevel::FullOutage,
    ];

    /// Remote component status this level maps to.
    ///
    /// Two-valued projection: `operational` or `major_outage`.
    pub fn component_status_name(&self) -> &'static str {
        match self {
            OperationalLevel::Operational => "operational",
            _ => "major_outage",
        }
    }

    /// Human description used to seed incident text
    pub fn description(&self) -> &'static str {
        match self {
            OperationalLevel::Operational => "Operating Normally",
            OperationalLevel::Degraded => "Service Degraded",
            OperationalLevel::PartialOutage => "Partial Service Outage",
            OperationalLevel::FullOutage => "Major Service Outage",
        }
    }

    pub fn is_operational(&self) -> bool {
        matches!(self, OperationalLevel::Operational)
    }
}

impl std::fmt::Display for OperationalLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationalLevel::Operational => "operational",
            OperationalLevel::Degraded => "degraded",
            OperationalLevel::PartialOutage => "partial_outage",
            OperationalLevel::FullOutage => "full_outage",
        };
        f.write_str(s)
    }
}

/// Details of an incident that may be opened on the status page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Incident title
    pub name: String,

    /// Incident body, also used as notification text
    pub description: String,
}

impl Incident {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Incident for a named target at the given level
    pub fn for_level(name: impl Into<String>, level: OperationalLevel) -> Self {
        Self::new(name, level.description())
    }
}

impl Default for Incident {
    fn default() -> Self {
        Self::new("Incident Name", "Incident Description")
    }
}

/// Outcome of one status synchronization call.
///
/// Fully derived from the remote reads and writes of a single call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncResult {
    /// A component status write was issued
    pub status_changed: bool,

    /// An incident was opened for the component
    pub incident_created: bool,

    /// One or more open incidents were resolved
    pub incident_resolved: bool,

    /// Incident details the call worked with
    pub incident: Incident,
}

impl SyncResult {
    /// Result for a call that left the remote state alone
    pub fn unchanged(incident: Incident) -> Self {
        Self {
            incident,
            ..Default::default()
        }
    }

    /// Whether an incident was opened or closed
    pub fn incident_changed(&self) -> bool {
        self.incident_created || self.incident_resolved
    }

    pub fn incident_description(&self) -> &str {
        &self.incident.description
    }
}

/// Result of one check cycle for a single target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Target name
    pub name: String,

    /// Level derived from the probe
    pub level: OperationalLevel,

    /// Probe failure message, empty on success
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Status page synchronization, when configured for the target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncResult>,

    /// A notification was handed to the notifier
    pub notified: bool,

    /// Probe duration in milliseconds
    pub duration_ms: u64,

    /// Completion timestamp
    pub checked_at: DateTime<Utc>,
}

impl CheckOutcome {
    pub fn is_operational(&self) -> bool {
        self.level.is_operational()
    }
}
