use serde::{Deserialize, Serialize};

use super::intent::{Entities, Intent};

pub const MAX_TRANSCRIPT_LEN: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct BotRequest {
    pub transcript: String,
}

/// Audit record of the single downstream call made for a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmCall {
    pub endpoint: String,
    pub method: String,
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResult {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BotSuccessResponse {
    pub intent: Intent,
    pub entities: Entities,
    pub crm_call: CrmCall,
    pub result: SuccessResult,
}
