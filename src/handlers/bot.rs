use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::errors::BotError;
use crate::models::{
    BotRequest, BotSuccessResponse, CrmCall, Entities, Intent, SuccessResult, MAX_TRANSCRIPT_LEN,
};
use crate::services::dispatch::{self, DispatchOutcome};
use crate::services::nlu;
use crate::state::AppState;

/// POST /bot/handle — the single entry point. Terminal at the first response:
/// length check, NLU, entity validation, then one CRM dispatch.
pub async fn handle_bot_request(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BotRequest>,
) -> Response {
    let transcript = req.transcript;
    tracing::info!(transcript = %transcript, "received transcript");

    if transcript.chars().count() > MAX_TRANSCRIPT_LEN {
        return BotError::validation(
            Intent::Unknown,
            format!("Transcript exceeds maximum length of {MAX_TRANSCRIPT_LEN} characters."),
        )
        .into_response();
    }

    let nlu_result = nlu::extract_entities(state.llm.as_ref(), &transcript).await;
    let intent = nlu_result.intent;
    let mut entities = nlu_result.entities;
    let entities_log = serde_json::Value::Object(entities.clone());
    tracing::info!(intent = ?intent, entities = %entities_log, "NLU result");

    if matches!(intent, Intent::Unknown | Intent::ParsingError) {
        return BotError::unintelligible(intent).into_response();
    }

    if let Some(details) = nlu::validate_entities(&entities, intent) {
        return BotError::validation(intent, details).into_response();
    }

    let outcome = dispatch::dispatch(intent, &mut entities, state.crm.as_ref()).await;
    translate(intent, entities, outcome)
}

/// Maps a dispatch outcome onto the wire envelope and status code.
fn translate(intent: Intent, entities: Entities, outcome: DispatchOutcome) -> Response {
    match outcome {
        DispatchOutcome::Success { call, message } => {
            tracing::info!(
                endpoint = %call.endpoint,
                status = call.status,
                response = %call.text,
                "CRM call successful"
            );
            let body = BotSuccessResponse {
                intent,
                entities,
                crm_call: CrmCall {
                    endpoint: call.endpoint,
                    method: call.method,
                    status_code: call.status,
                },
                result: SuccessResult { message },
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        DispatchOutcome::CrmUnreachable(e) => {
            tracing::error!(error = %e, "CRM connection error");
            BotError::crm_unreachable(intent, &e).into_response()
        }
        DispatchOutcome::CrmRejected(resp) => {
            tracing::error!(
                status = resp.status,
                body = %resp.text,
                "CRM returned non-2xx response"
            );
            BotError::crm_rejected(intent, &resp.text).into_response()
        }
        DispatchOutcome::NoActionConfigured => {
            tracing::error!(intent = ?intent, "no action configured for intent");
            BotError::no_action(intent).into_response()
        }
        DispatchOutcome::Internal(e) => {
            tracing::error!(error = %e, "unexpected internal error");
            BotError::internal(intent, &e).into_response()
        }
    }
}
