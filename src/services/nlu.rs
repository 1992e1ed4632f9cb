use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::models::{entity_str, Entities, Intent, NluResult};
use crate::services::ai::LlmProvider;

const SYSTEM_PROMPT: &str = r#"You are an expert NLU system for a CRM. Your task is to identify the user's intent and extract entities from their transcript.
The possible intents are: LEAD_CREATE, VISIT_SCHEDULE, LEAD_UPDATE, UNKNOWN.
The entities to extract are: name, phone, city, source, lead_id, visit_time, status, notes.
- For visit_time, always convert casual dates like 'tomorrow 3 pm' to a full ISO 8601 datetime string.
- For phone numbers, normalize to a simple string of digits.
- Status must be one of: NEW, IN_PROGRESS, FOLLOW_UP, WON, LOST.
Respond ONLY with a single, raw, minified JSON object in the format: {"intent": "...", "entities": {...}}.
Do not wrap the JSON in markdown backticks or any other text.
If the intent is unclear, return {"intent": "UNKNOWN", "entities": {}}."#;

/// Classifies a transcript and extracts entities via the LLM. Never fails:
/// any provider or parsing problem collapses to a PARSING_ERROR result.
pub async fn extract_entities(llm: &dyn LlmProvider, transcript: &str) -> NluResult {
    let today = Utc::now().format("%Y-%m-%d");
    let prompt = format!(
        "{SYSTEM_PROMPT}\nAssume the current date is {today}.\n\nTranscript: \"{transcript}\""
    );

    let response = match llm.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "LLM call failed");
            return NluResult::parsing_error();
        }
    };

    match parse_nlu_response(&response) {
        Some(mut result) => {
            normalize_entities(&mut result.entities);
            result
        }
        None => {
            tracing::warn!("failed to parse LLM response as NLU JSON");
            NluResult::parsing_error()
        }
    }
}

fn parse_nlu_response(response: &str) -> Option<NluResult> {
    // Try direct parse first
    if let Ok(result) = serde_json::from_str::<NluResult>(response) {
        return Some(result);
    }

    // Strip markdown code fences
    let cleaned = response
        .trim()
        .strip_prefix("```json")
        .or_else(|| response.trim().strip_prefix("```"))
        .unwrap_or(response.trim());
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    if let Ok(result) = serde_json::from_str::<NluResult>(cleaned) {
        return Some(result);
    }

    // Try to find a JSON object in the response
    if let Some(start) = cleaned.find('{') {
        if let Some(end) = cleaned.rfind('}') {
            if let Ok(result) = serde_json::from_str::<NluResult>(&cleaned[start..=end]) {
                return Some(result);
            }
        }
    }

    None
}

/// Post-processing the prompt cannot guarantee: visit_time re-parsed into a
/// canonical ISO-8601 string, phone reduced to digits, status uppercased.
fn normalize_entities(entities: &mut Entities) {
    if let Some(normalized) = entity_str(entities, "visit_time").and_then(normalize_visit_time) {
        entities.insert("visit_time".to_string(), Value::String(normalized));
    }
    if let Some(phone) = entity_str(entities, "phone") {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            entities.insert("phone".to_string(), Value::String(digits));
        }
    }
    if let Some(status) = entity_str(entities, "status") {
        let upper = status.to_ascii_uppercase();
        entities.insert("status".to_string(), Value::String(upper));
    }
}

fn normalize_visit_time(raw: &str) -> Option<String> {
    const OUT: &str = "%Y-%m-%dT%H:%M:%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().format(OUT).to_string());
    }
    for fmt in [OUT, "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.format(OUT).to_string());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.format(OUT).to_string());
    }

    // Leave unrecognized values untouched rather than dropping them
    None
}

/// Checks that every entity the intent requires is present and non-empty.
/// Returns None when satisfied, otherwise a message naming all missing fields
/// in required-field order.
pub fn validate_entities(entities: &Entities, intent: Intent) -> Option<String> {
    let required: &[&str] = match intent {
        Intent::LeadCreate => &["name", "phone", "city"],
        Intent::VisitSchedule => &["lead_id", "visit_time"],
        Intent::LeadUpdate => &["lead_id", "status"],
        Intent::Unknown | Intent::ParsingError => &[],
    };

    let missing: Vec<&str> = required
        .iter()
        .filter(|key| entity_str(entities, key).is_none())
        .copied()
        .collect();

    if missing.is_empty() {
        None
    } else {
        Some(format!(
            "Missing required entities: {}. Please provide all necessary information.",
            missing.join(", ")
        ))
    }
}
