//! Generative fallback: asks the LLM to write a profile when no structured
//! source knows the name.
//!
//! Unlike the other sources a failure here is not swallowed: the resolver
//! turns it into "not found".

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::candidate::{Candidate, SourceKind};
use crate::llm::{LlmProvider, ProviderError};

/// `{name}` is replaced with the query as the user typed it.
pub const PROMPT_TEMPLATE: &str =
    "Create a superhero profile for {name}. Include powers, backstory, and uniqueness.";

pub fn prompt_for(name: &str) -> String {
    PROMPT_TEMPLATE.replace("{name}", name)
}

/// Clones share the request counter.
#[derive(Debug, Clone)]
pub struct GeneratedAdapter {
    provider: LlmProvider,
    requests: Arc<AtomicUsize>,
}

impl GeneratedAdapter {
    pub fn new(provider: LlmProvider) -> Self {
        Self { provider, requests: Arc::default() }
    }

    /// Generation requests made so far, successful or not.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Produce exactly one `Generated` candidate for `name`.
    pub async fn generate(&self, name: &str) -> Result<Candidate, ProviderError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let prompt = prompt_for(name);
        debug!(provider = self.provider.name(), %name, "requesting generated profile");

        let prose = self.provider.complete(&prompt).await?;
        info!(provider = self.provider.name(), %name, chars = prose.len(), "generated profile");

        Candidate::new(SourceKind::Generated, name)
            .map(|c| c.with_summary(prose))
            .ok_or_else(|| ProviderError::Request("cannot generate a profile for a blank name".into()))
    }
}
