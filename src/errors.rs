use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::models::Intent;

/// Error taxonomy surfaced to callers. Every failure path maps onto one of
/// these three kinds; the HTTP status disambiguates within a kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ParsingError,
    ValidationError,
    CrmError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub details: String,
}

#[derive(Debug, Serialize)]
pub struct BotErrorResponse {
    pub intent: Intent,
    pub error: ErrorDetails,
}

/// An error envelope plus the status it rides on. Constructors cover the
/// handler's terminal failure states; none of them panic or crash the server.
#[derive(Debug)]
pub struct BotError {
    pub status: StatusCode,
    pub intent: Intent,
    pub kind: ErrorKind,
    pub details: String,
}

impl BotError {
    pub fn unintelligible(intent: Intent) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            intent,
            kind: ErrorKind::ParsingError,
            details: "Could not understand the request.".to_string(),
        }
    }

    pub fn validation(intent: Intent, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            intent,
            kind: ErrorKind::ValidationError,
            details: details.into(),
        }
    }

    pub fn crm_unreachable(intent: Intent, source: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            intent,
            kind: ErrorKind::CrmError,
            details: format!("CRM connection error: {source}"),
        }
    }

    pub fn crm_rejected(intent: Intent, body: &str) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            intent,
            kind: ErrorKind::CrmError,
            details: format!("CRM returned an error: {body}"),
        }
    }

    pub fn no_action(intent: Intent) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            intent,
            kind: ErrorKind::ParsingError,
            details: "Intent recognized but no action configured.".to_string(),
        }
    }

    pub fn internal(intent: Intent, source: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            intent,
            kind: ErrorKind::ParsingError,
            details: format!("An internal error occurred: {source}"),
        }
    }
}

impl IntoResponse for BotError {
    fn into_response(self) -> Response {
        let body = BotErrorResponse {
            intent: self.intent,
            error: ErrorDetails {
                kind: self.kind,
                details: self.details,
            },
        };
        (self.status, axum::Json(body)).into_response()
    }
}
