use crate::config::AppConfig;
use crate::services::ai::LlmProvider;
use crate::services::crm::CrmApi;

pub struct AppState {
    pub config: AppConfig,
    pub llm: Box<dyn LlmProvider>,
    pub crm: Box<dyn CrmApi>,
}
