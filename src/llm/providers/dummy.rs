//! Dummy LLM provider: echoes input back prefixed with `[echo]`.
//! Used for offline runs and tests without an API key.

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, content: &str) -> Result<String, ProviderError> {
        Ok(format!("[echo] {content}"))
    }
}
