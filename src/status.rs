//! Status page incident webhook payloads.

use std::fmt;

use serde::Deserialize;

/// Lifecycle state of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum IncidentStatus {
    Investigating,
    Identified,
    Monitoring,
    Resolved,
}

impl IncidentStatus {
    /// Emoji shown in front of the incident report.
    pub fn emoji(&self) -> &'static str {
        match self {
            IncidentStatus::Investigating => "🔍",
            IncidentStatus::Identified => "🛠",
            IncidentStatus::Monitoring => "👀",
            IncidentStatus::Resolved => "✅",
        }
    }

    /// Status name as sent by the status page.
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Investigating => "Investigating",
            IncidentStatus::Identified => "Identified",
            IncidentStatus::Monitoring => "Monitoring",
            IncidentStatus::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A system affected by an incident.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Component {
    pub name: String,
    /// Free-form component status, e.g. "Degraded performance".
    pub status: String,
}

/// Incident as posted by the status page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Incident {
    pub name: String,
    pub status: IncidentStatus,
    #[serde(default)]
    pub affected_components: Vec<Component>,
    pub url: String,
}

/// Webhook request body. Component-only updates arrive without an
/// `incident` and are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub incident: Option<Incident>,
}
