use serde::{Deserialize, Serialize};

/// Working entity map extracted from a transcript. Values come straight from
/// the model's JSON, so they may be null or non-string; [`entity_str`] is the
/// single place that decides what counts as a usable value.
pub type Entities = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    LeadCreate,
    VisitSchedule,
    LeadUpdate,
    Unknown,
    ParsingError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NluResult {
    pub intent: Intent,
    #[serde(default)]
    pub entities: Entities,
}

impl NluResult {
    /// The fallback returned whenever the model call or its output cannot be
    /// used. Callers treat it the same as an uninterpretable transcript.
    pub fn parsing_error() -> Self {
        Self {
            intent: Intent::ParsingError,
            entities: Entities::new(),
        }
    }
}

/// Returns the entity value if it is present as a non-empty string.
pub fn entity_str<'a>(entities: &'a Entities, key: &str) -> Option<&'a str> {
    entities
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}
