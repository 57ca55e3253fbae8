//! Pure projection of a feed incident into the webhook embed shape.

use crate::models::{Impact, Incident};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const COLOR_RESOLVED: u32 = 0x57F287;
pub const COLOR_CRITICAL: u32 = 0xED4245;
pub const COLOR_MAJOR: u32 = 0xE67E22;
pub const COLOR_MINOR: u32 = 0xFEE75C;
pub const COLOR_DEFAULT: u32 = 0x23272A;

/// Presentation-ready embed in the webhook wire shape. Computed per tick,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageEmbed {
    pub title: String,
    pub url: String,
    pub color: u32,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub footer: EmbedFooter,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

pub fn format_incident(incident: &Incident) -> MessageEmbed {
    // Update history arrives newest-first; the timeline reads oldest-first.
    let fields = incident
        .incident_updates
        .iter()
        .rev()
        .map(|update| EmbedField {
            name: format!(
                "{} (<t:{}:t>)",
                capitalize(&update.status),
                update.created_at.timestamp()
            ),
            value: update.body.clone(),
        })
        .collect();

    let mut description = format!("• Impact: {}", incident.impact);
    if !incident.components.is_empty() {
        let names: Vec<&str> = incident
            .components
            .iter()
            .map(|component| component.name.as_str())
            .collect();
        description.push_str(&format!("\n• Affected Components: {}", names.join(", ")));
    }

    MessageEmbed {
        title: incident.name.clone(),
        url: incident.shortlink.clone(),
        color: embed_color(incident),
        timestamp: incident.started_at,
        description,
        footer: EmbedFooter {
            text: format!("Incident {}", incident.id),
        },
        fields,
    }
}

/// Closed incidents are always green; live ones are colored by impact.
fn embed_color(incident: &Incident) -> u32 {
    if incident.status.is_closed() {
        return COLOR_RESOLVED;
    }

    match incident.impact {
        Impact::Critical => COLOR_CRITICAL,
        Impact::Major => COLOR_MAJOR,
        Impact::Minor => COLOR_MINOR,
        Impact::None => COLOR_DEFAULT,
    }
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
