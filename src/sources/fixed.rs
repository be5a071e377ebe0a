//! Fixed source: canned answers, no network.
//!
//! Returns the same outcome for every query and counts how often it was
//! asked. Clones share the counter, so a caller can keep one clone and hand
//! the other to a resolver.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::candidate::{Candidate, SourceKind};
use super::AdapterError;

pub const SOURCE_NAME: &str = "fixed";

#[derive(Debug, Clone)]
enum Outcome {
    Candidates(Vec<Candidate>),
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct FixedAdapter {
    kind: SourceKind,
    outcome: Outcome,
    calls: Arc<AtomicUsize>,
}

impl FixedAdapter {
    /// Always answer with `candidates`.
    pub fn returning(kind: SourceKind, candidates: Vec<Candidate>) -> Self {
        Self { kind, outcome: Outcome::Candidates(candidates), calls: Arc::default() }
    }

    /// Always answer "no match".
    pub fn empty(kind: SourceKind) -> Self {
        Self::returning(kind, Vec::new())
    }

    /// Always fail as if the network were down.
    pub fn unavailable(kind: SourceKind) -> Self {
        Self { kind, outcome: Outcome::Unavailable, calls: Arc::default() }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Number of queries answered so far, across all clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn query(&self, _text: &str) -> Result<Vec<Candidate>, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Candidates(c) => Ok(c.clone()),
            Outcome::Unavailable => Err(AdapterError::Unavailable {
                source_name: SOURCE_NAME,
                reason: "simulated outage".into(),
            }),
        }
    }
}
