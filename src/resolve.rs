//! Resolution pipeline: walks the sources in priority order and stops at
//! the first one that has an answer.
//!
//! Hero queries:
//!
//! ```text
//! custom store (exact, then substring)
//!   → structured chain (configured order, e.g. comicvine → marvel → superhero)
//!     → generative fallback
//!       → not found
//! ```
//!
//! Anime queries use the anime source alone.
//!
//! Source failures never escape: a structured source that errors is logged
//! and skipped, and a failed generation becomes [`Resolution::NotFound`].
//! Resolution is read-only.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::candidate::{Candidate, SourceKind};
use crate::config::Config;
use crate::error::AppError;
use crate::llm::providers;
use crate::sources::generated::GeneratedAdapter;
use crate::sources::{self, SourceAdapter};
use crate::store::{CustomEntry, EntryStore};

// ── Resolution ────────────────────────────────────────────────────────────────

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// `candidates` is never empty and all share `source`.
    Matched { source: SourceKind, candidates: Vec<Candidate> },
    NotFound,
}

impl Resolution {
    pub fn matched(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }

    pub fn source(&self) -> Option<SourceKind> {
        match self {
            Resolution::Matched { source, .. } => Some(*source),
            Resolution::NotFound => None,
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        match self {
            Resolution::Matched { candidates, .. } => candidates,
            Resolution::NotFound => &[],
        }
    }

    fn from_candidates(source: SourceKind, candidates: Vec<Candidate>) -> Option<Self> {
        (!candidates.is_empty()).then_some(Resolution::Matched { source, candidates })
    }
}

// ── Resolver ──────────────────────────────────────────────────────────────────

/// Shared, immutable pipeline. One instance serves every chat concurrently.
pub struct Resolver {
    store: Arc<dyn EntryStore>,
    chain: Vec<SourceAdapter>,
    anime: Option<SourceAdapter>,
    fallback: Option<GeneratedAdapter>,
}

impl Resolver {
    pub fn new(
        store: Arc<dyn EntryStore>,
        chain: Vec<SourceAdapter>,
        fallback: Option<GeneratedAdapter>,
    ) -> Self {
        Self { store, chain, anime: None, fallback }
    }

    pub fn with_anime(mut self, adapter: SourceAdapter) -> Self {
        self.anime = Some(adapter);
        self
    }

    /// Build every source described by `config` around `store`.
    pub fn from_config(config: &Config, store: Arc<dyn EntryStore>) -> Result<Self, AppError> {
        let chain = sources::build_chain(config).map_err(|e| AppError::Config(e.to_string()))?;
        let anime = sources::build_anime(config).map_err(|e| AppError::Config(e.to_string()))?;

        let fallback = if config.fallback.enabled {
            let provider = providers::build(&config.llm, config.secrets.llm_api_key.clone())
                .map_err(|e| AppError::Config(e.to_string()))?;
            Some(GeneratedAdapter::new(provider))
        } else {
            None
        };

        info!(
            store = store.store_type(),
            chain = ?chain.iter().map(SourceAdapter::name).collect::<Vec<_>>(),
            fallback = fallback.is_some(),
            "resolver ready"
        );

        Ok(Self::new(store, chain, fallback).with_anime(anime))
    }

    pub fn store(&self) -> &Arc<dyn EntryStore> {
        &self.store
    }

    /// Run the hero pipeline for `query`.
    pub async fn resolve_hero(&self, query: &str) -> Resolution {
        let query = query.trim();
        if query.is_empty() {
            return Resolution::NotFound;
        }

        if let Some(found) = self.resolve_custom(query) {
            info!(%query, source = %SourceKind::Custom, "resolved");
            return found;
        }

        for adapter in &self.chain {
            if let Some(found) = query_adapter(adapter, query).await {
                info!(%query, source = %adapter.kind(), adapter = adapter.name(), "resolved");
                return found;
            }
        }

        let Some(fallback) = &self.fallback else {
            debug!(%query, "chain exhausted and fallback disabled");
            return Resolution::NotFound;
        };

        match fallback.generate(query).await {
            Ok(candidate) => {
                info!(%query, source = %SourceKind::Generated, "resolved");
                Resolution::Matched { source: SourceKind::Generated, candidates: vec![candidate] }
            }
            Err(e) => {
                warn!(%query, error = %e, "generative fallback failed");
                Resolution::NotFound
            }
        }
    }

    /// Run the anime pipeline for `query`: one source, no store, no fallback.
    pub async fn resolve_anime(&self, query: &str) -> Resolution {
        let query = query.trim();
        if query.is_empty() {
            return Resolution::NotFound;
        }
        let Some(adapter) = &self.anime else {
            warn!(%query, "anime lookup requested but no anime source configured");
            return Resolution::NotFound;
        };
        query_adapter(adapter, query).await.unwrap_or(Resolution::NotFound)
    }

    /// Exact name first; substring only when there is no exact hit.
    fn resolve_custom(&self, query: &str) -> Option<Resolution> {
        let entries = match self.store.lookup_exact(query) {
            Ok(Some(entry)) => vec![entry],
            Ok(None) => self.store.lookup_substring(query).unwrap_or_else(|e| {
                warn!(%query, error = %e, "custom store substring lookup failed");
                Vec::new()
            }),
            Err(e) => {
                warn!(%query, error = %e, "custom store lookup failed");
                Vec::new()
            }
        };
        let candidates = entries.iter().filter_map(CustomEntry::to_candidate).collect();
        Resolution::from_candidates(SourceKind::Custom, candidates)
    }
}

/// Query one adapter; unavailability counts as no match.
async fn query_adapter(adapter: &SourceAdapter, query: &str) -> Option<Resolution> {
    match adapter.query(query).await {
        Ok(candidates) => {
            debug!(%query, adapter = adapter.name(), hits = candidates.len(), "source answered");
            Resolution::from_candidates(adapter.kind(), candidates)
        }
        Err(e) => {
            warn!(%query, adapter = adapter.name(), error = %e, "source unavailable, skipping");
            None
        }
    }
}
