use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status reported by the status page. Unknown strings are kept
/// rather than rejected so a feed-side addition cannot break the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Investigating,
    Identified,
    Monitoring,
    Resolved,
    Postmortem,
    #[serde(other)]
    Unknown,
}

impl IncidentStatus {
    /// Resolved and postmortem incidents are closed; everything else is
    /// still live.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Resolved | Self::Postmortem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Critical,
    Major,
    Minor,
    #[default]
    #[serde(other)]
    None,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Impact::Critical => "critical",
            Impact::Major => "major",
            Impact::Minor => "minor",
            Impact::None => "none",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
}

/// One timestamped entry in an incident's update history. The feed delivers
/// these newest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentUpdate {
    pub status: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A status-page incident as delivered by the feed. Read-only to the mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub status: IncidentStatus,
    #[serde(default)]
    pub impact: Impact,
    pub name: String,
    pub shortlink: String,
    pub started_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub incident_updates: Vec<IncidentUpdate>,
}

impl Incident {
    /// The remote-side timestamp compared against a stored record to decide
    /// whether the incident needs action.
    pub fn remote_update_time(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// The mirror's persisted memory of one incident's notification state.
///
/// `last_update` is the wall-clock time of the last successful notify (or
/// silent seed), not the incident's own timestamp. `message_id` is present
/// iff a webhook message was successfully created for this incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub incident_id: String,
    pub last_update: DateTime<Utc>,
    pub message_id: Option<String>,
    pub resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_feed_incident() {
        let raw = r#"{
            "id": "p31zjtct2jer",
            "status": "investigating",
            "impact": "major",
            "name": "API errors",
            "shortlink": "https://stspg.io/abc123",
            "started_at": "2024-05-01T12:00:00Z",
            "created_at": "2024-05-01T12:00:00Z",
            "updated_at": "2024-05-01T12:30:00Z",
            "components": [{"name": "API"}],
            "incident_updates": [
                {"status": "investigating", "body": "Looking into it", "created_at": "2024-05-01T12:00:00Z"}
            ]
        }"#;

        let parsed = serde_json::from_str::<Incident>(raw);
        assert!(parsed.is_ok());
        let incident = match parsed {
            Ok(incident) => incident,
            Err(_) => return,
        };

        assert_eq!(incident.status, IncidentStatus::Investigating);
        assert_eq!(incident.impact, Impact::Major);
        assert_eq!(incident.components.len(), 1);
        assert!(incident.updated_at.is_some());
    }

    #[test]
    fn unknown_status_and_missing_impact_fall_back() {
        let raw = r#"{
            "id": "x",
            "status": "scheduled",
            "name": "Maintenance",
            "shortlink": "https://stspg.io/x",
            "started_at": "2024-05-01T12:00:00Z",
            "created_at": "2024-05-01T12:00:00Z"
        }"#;

        let parsed = serde_json::from_str::<Incident>(raw);
        assert!(parsed.is_ok());
        let incident = match parsed {
            Ok(incident) => incident,
            Err(_) => return,
        };

        assert_eq!(incident.status, IncidentStatus::Unknown);
        assert_eq!(incident.impact, Impact::None);
        assert!(incident.components.is_empty());
        assert!(incident.incident_updates.is_empty());
    }

    #[test]
    fn closed_statuses_are_resolved_and_postmortem_only() {
        assert!(IncidentStatus::Resolved.is_closed());
        assert!(IncidentStatus::Postmortem.is_closed());
        assert!(!IncidentStatus::Investigating.is_closed());
        assert!(!IncidentStatus::Identified.is_closed());
        assert!(!IncidentStatus::Monitoring.is_closed());
        assert!(!IncidentStatus::Unknown.is_closed());
    }

    #[test]
    fn remote_update_time_prefers_updated_at() {
        let raw = r#"{
            "id": "x",
            "status": "monitoring",
            "name": "n",
            "shortlink": "https://stspg.io/x",
            "started_at": "2024-05-01T12:00:00Z",
            "created_at": "2024-05-01T12:00:00Z",
            "updated_at": "2024-05-01T13:00:00Z"
        }"#;

        let parsed = serde_json::from_str::<Incident>(raw);
        assert!(parsed.is_ok());
        let incident = match parsed {
            Ok(incident) => incident,
            Err(_) => return,
        };

        assert_eq!(incident.remote_update_time(), incident.updated_at.unwrap_or(incident.created_at));
        assert_ne!(incident.remote_update_time(), incident.created_at);
    }
}
