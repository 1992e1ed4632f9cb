pub mod gemini;

use async_trait::async_trait;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Runs one prompt through the model and returns its raw text output.
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
