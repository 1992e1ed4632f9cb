use serde::Serialize;

use super::intent::{entity_str, Entities};

/// Raised when a payload constructor cannot find a field the validator
/// guarantees. Reaching it means the validator and the constructors disagree.
#[derive(Debug, thiserror::Error)]
#[error("required entity '{0}' missing after validation")]
pub struct MissingEntity(pub &'static str);

/// Outbound body for `POST {base}/crm/leads`.
#[derive(Debug, Clone, Serialize)]
pub struct LeadCreatePayload {
    pub name: String,
    pub phone: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl LeadCreatePayload {
    pub fn from_entities(entities: &Entities) -> Result<Self, MissingEntity> {
        Ok(Self {
            name: required(entities, "name")?,
            phone: required(entities, "phone")?,
            city: required(entities, "city")?,
            source: optional(entities, "source"),
        })
    }
}

/// Outbound body for `POST {base}/crm/visits`.
#[derive(Debug, Clone, Serialize)]
pub struct VisitCreatePayload {
    pub lead_id: String,
    pub visit_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl VisitCreatePayload {
    pub fn from_entities(entities: &Entities) -> Result<Self, MissingEntity> {
        Ok(Self {
            lead_id: required(entities, "lead_id")?,
            visit_time: required(entities, "visit_time")?,
            notes: optional(entities, "notes"),
        })
    }
}

/// Outbound body for `POST {base}/crm/leads/{lead_id}/status`. The lead id
/// travels in the URL path, never in this body.
#[derive(Debug, Clone, Serialize)]
pub struct LeadUpdatePayload {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LeadUpdatePayload {
    pub fn from_entities(entities: &Entities) -> Result<Self, MissingEntity> {
        Ok(Self {
            status: required(entities, "status")?,
            notes: optional(entities, "notes"),
        })
    }
}

fn required(entities: &Entities, key: &'static str) -> Result<String, MissingEntity> {
    entity_str(entities, key)
        .map(str::to_string)
        .ok_or(MissingEntity(key))
}

fn optional(entities: &Entities, key: &str) -> Option<String> {
    entity_str(entities, key).map(str::to_string)
}
