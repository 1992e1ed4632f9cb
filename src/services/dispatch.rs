use crate::models::{
    Entities, Intent, LeadCreatePayload, LeadUpdatePayload, VisitCreatePayload,
};
use crate::services::crm::{CrmApi, CrmOutcome, CrmResponse};

/// Result of routing one validated intent to the CRM. Exactly one downstream
/// call is made on the three actionable intents; the rest make none.
#[derive(Debug)]
pub enum DispatchOutcome {
    Success { call: CrmResponse, message: String },
    CrmRejected(CrmResponse),
    CrmUnreachable(String),
    NoActionConfigured,
    Internal(String),
}

/// Maps an intent to its CRM action, builds the outbound payload from the
/// entities, and performs the call. For LEAD_UPDATE the lead_id is removed
/// from the working map first: it addresses the lead in the URL path and must
/// not appear in the body or the echoed entities.
pub async fn dispatch(
    intent: Intent,
    entities: &mut Entities,
    crm: &dyn CrmApi,
) -> DispatchOutcome {
    match intent {
        Intent::LeadCreate => {
            let payload = match LeadCreatePayload::from_entities(entities) {
                Ok(p) => p,
                Err(e) => return DispatchOutcome::Internal(e.to_string()),
            };
            let outcome = crm.create_lead(&payload).await;
            complete(outcome, |resp| {
                format!(
                    "Successfully created lead with ID: {}",
                    body_field(resp, "lead_id")
                )
            })
        }
        Intent::VisitSchedule => {
            let payload = match VisitCreatePayload::from_entities(entities) {
                Ok(p) => p,
                Err(e) => return DispatchOutcome::Internal(e.to_string()),
            };
            let outcome = crm.schedule_visit(&payload).await;
            complete(outcome, |resp| {
                format!(
                    "Successfully scheduled visit with ID: {}",
                    body_field(resp, "visit_id")
                )
            })
        }
        Intent::LeadUpdate => {
            let lead_id = match entities.remove("lead_id").as_ref().and_then(|v| v.as_str()) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => {
                    return DispatchOutcome::Internal(
                        "required entity 'lead_id' missing after validation".to_string(),
                    )
                }
            };
            let payload = match LeadUpdatePayload::from_entities(entities) {
                Ok(p) => p,
                Err(e) => return DispatchOutcome::Internal(e.to_string()),
            };
            let outcome = crm.update_lead_status(&lead_id, &payload).await;
            complete(outcome, |resp| {
                format!(
                    "Successfully updated lead {} to status {}",
                    lead_id,
                    body_field(resp, "status")
                )
            })
        }
        Intent::Unknown | Intent::ParsingError => DispatchOutcome::NoActionConfigured,
    }
}

fn complete(outcome: CrmOutcome, message: impl FnOnce(&CrmResponse) -> String) -> DispatchOutcome {
    match outcome {
        CrmOutcome::Success(resp) => {
            let message = message(&resp);
            DispatchOutcome::Success {
                call: resp,
                message,
            }
        }
        CrmOutcome::Failed(resp) => DispatchOutcome::CrmRejected(resp),
        CrmOutcome::Unreachable(e) => DispatchOutcome::CrmUnreachable(e),
    }
}

fn body_field(resp: &CrmResponse, key: &str) -> String {
    resp.body
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::models::entity_str;

    /// Records every call and replays a canned outcome.
    struct RecordingCrm {
        outcome: fn() -> CrmOutcome,
        calls: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl RecordingCrm {
        fn new(outcome: fn() -> CrmOutcome) -> Self {
            Self {
                outcome,
                calls: Mutex::new(vec![]),
            }
        }
    }

    fn ok_response(body: serde_json::Value) -> CrmOutcome {
        CrmOutcome::Success(CrmResponse {
            endpoint: "http://mock-crm/crm/leads".to_string(),
            method: "POST".to_string(),
            status: 200,
            text: body.to_string(),
            body,
        })
    }

    #[async_trait]
    impl CrmApi for RecordingCrm {
        async fn create_lead(&self, payload: &LeadCreatePayload) -> CrmOutcome {
            self.calls
                .lock()
                .unwrap()
                .push(("create_lead".to_string(), json!(payload)));
            (self.outcome)()
        }

        async fn schedule_visit(&self, payload: &VisitCreatePayload) -> CrmOutcome {
            self.calls
                .lock()
                .unwrap()
                .push(("schedule_visit".to_string(), json!(payload)));
            (self.outcome)()
        }

        async fn update_lead_status(
            &self,
            lead_id: &str,
            payload: &LeadUpdatePayload,
        ) -> CrmOutcome {
            self.calls
                .lock()
                .unwrap()
                .push((format!("update_lead_status/{lead_id}"), json!(payload)));
            (self.outcome)()
        }
    }

    fn entities(pairs: &[(&str, &str)]) -> Entities {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[tokio::test]
    async fn test_lead_create_success_message() {
        let crm = RecordingCrm::new(|| ok_response(json!({"lead_id": "mock-uuid-123"})));
        let mut e = entities(&[
            ("name", "Rohan Sharma"),
            ("phone", "9876543210"),
            ("city", "Gurgaon"),
        ]);

        match dispatch(Intent::LeadCreate, &mut e, &crm).await {
            DispatchOutcome::Success { message, .. } => {
                assert_eq!(message, "Successfully created lead with ID: mock-uuid-123");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(crm.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lead_update_pops_lead_id() {
        let crm = RecordingCrm::new(|| ok_response(json!({"status": "WON"})));
        let mut e = entities(&[("lead_id", "7b1b8f54"), ("status", "WON")]);

        let outcome = dispatch(Intent::LeadUpdate, &mut e, &crm).await;
        match outcome {
            DispatchOutcome::Success { message, .. } => {
                assert_eq!(message, "Successfully updated lead 7b1b8f54 to status WON");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        // lead_id travels in the path, never in the body or working map
        let calls = crm.calls.lock().unwrap();
        assert_eq!(calls[0].0, "update_lead_status/7b1b8f54");
        assert!(calls[0].1.get("lead_id").is_none());
        assert!(entity_str(&e, "lead_id").is_none());
    }

    #[tokio::test]
    async fn test_unknown_intent_has_no_action() {
        let crm = RecordingCrm::new(|| ok_response(json!({})));
        let mut e = Entities::new();

        let outcome = dispatch(Intent::Unknown, &mut e, &crm).await;
        assert!(matches!(outcome, DispatchOutcome::NoActionConfigured));
        assert!(crm.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_required_field_is_internal_not_panic() {
        let crm = RecordingCrm::new(|| ok_response(json!({})));
        let mut e = Entities::new();

        let outcome = dispatch(Intent::LeadCreate, &mut e, &crm).await;
        match outcome {
            DispatchOutcome::Internal(details) => assert!(details.contains("name")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(crm.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_crm_is_surfaced() {
        let crm = RecordingCrm::new(|| CrmOutcome::Unreachable("connection refused".to_string()));
        let mut e = entities(&[("lead_id", "7b1b8f54"), ("visit_time", "2025-10-07T15:00:00")]);

        let outcome = dispatch(Intent::VisitSchedule, &mut e, &crm).await;
        match outcome {
            DispatchOutcome::CrmUnreachable(e) => assert_eq!(e, "connection refused"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
