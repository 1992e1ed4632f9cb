use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::{LeadCreatePayload, LeadUpdatePayload, VisitCreatePayload};

const CRM_TIMEOUT: Duration = Duration::from_secs(5);

/// What one CRM call produced when a response was obtained, whatever its
/// status. Carries enough to audit the call and to quote the CRM's body back
/// to the caller.
#[derive(Debug, Clone)]
pub struct CrmResponse {
    pub endpoint: String,
    pub method: String,
    pub status: u16,
    pub body: serde_json::Value,
    pub text: String,
}

/// Three-way outcome of a CRM call, matched exhaustively by the dispatcher.
#[derive(Debug)]
pub enum CrmOutcome {
    /// 2xx response.
    Success(CrmResponse),
    /// Response obtained but non-2xx.
    Failed(CrmResponse),
    /// No response obtained: connect failure, DNS, timeout.
    Unreachable(String),
}

#[async_trait]
pub trait CrmApi: Send + Sync {
    async fn create_lead(&self, payload: &LeadCreatePayload) -> CrmOutcome;
    async fn schedule_visit(&self, payload: &VisitCreatePayload) -> CrmOutcome;
    async fn update_lead_status(&self, lead_id: &str, payload: &LeadUpdatePayload) -> CrmOutcome;
}

pub struct CrmHttpClient {
    base_url: String,
    client: reqwest::Client,
}

impl CrmHttpClient {
    pub fn new(base_url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(CRM_TIMEOUT)
            .build()
            .context("failed to build CRM HTTP client")?;
        Ok(Self { base_url, client })
    }

    async fn post_json<T: Serialize + Sync>(&self, endpoint: String, payload: &T) -> CrmOutcome {
        let resp = match self.client.post(&endpoint).json(payload).send().await {
            Ok(resp) => resp,
            Err(e) => return CrmOutcome::Unreachable(e.to_string()),
        };

        let status = resp.status();
        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => return CrmOutcome::Unreachable(e.to_string()),
        };
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);

        let response = CrmResponse {
            endpoint,
            method: "POST".to_string(),
            status: status.as_u16(),
            body,
            text,
        };
        if status.is_success() {
            CrmOutcome::Success(response)
        } else {
            CrmOutcome::Failed(response)
        }
    }
}

#[async_trait]
impl CrmApi for CrmHttpClient {
    async fn create_lead(&self, payload: &LeadCreatePayload) -> CrmOutcome {
        let url = format!("{}/crm/leads", self.base_url);
        self.post_json(url, payload).await
    }

    async fn schedule_visit(&self, payload: &VisitCreatePayload) -> CrmOutcome {
        let url = format!("{}/crm/visits", self.base_url);
        self.post_json(url, payload).await
    }

    async fn update_lead_status(&self, lead_id: &str, payload: &LeadUpdatePayload) -> CrmOutcome {
        let url = format!("{}/crm/leads/{}/status", self.base_url, lead_id);
        self.post_json(url, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction() {
        assert!(CrmHttpClient::new("http://localhost:8001".to_string()).is_ok());
    }
}
