//! Custom entry store: user-submitted heroes consulted before any remote source.
//!
//! [`EntryStore`] is the pluggable interface; two backends ship:
//!
//! - [`json_file::JsonFileStore`]: in-memory index rehydrated from a single
//!   JSON snapshot, replaced atomically on every append.
//! - [`memory::MemoryStore`]: no persistence (tests, dry runs).
//!
//! Entries are append-only: adding a name that already exists creates a
//! second entry. Lookups are case-insensitive on the trimmed name.

pub mod json_file;
pub mod memory;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, SourceKind};
use crate::error::AppError;

// ── CustomEntry ───────────────────────────────────────────────────────────────

/// A persisted, user-submitted hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEntry {
    pub name: String,
    #[serde(alias = "description")]
    pub summary: String,
    #[serde(default, alias = "image", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Free-form extra fields supplied with a JSON submission.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
    /// Chat user id of the submitter, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,
    /// RFC 3339 timestamp set on append.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
}

impl CustomEntry {
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
            image_url: None,
            extra: BTreeMap::new(),
            added_by: None,
            added_at: None,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Reject entries without a name or summary.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("hero name must not be empty".into()));
        }
        if self.summary.trim().is_empty() {
            return Err(AppError::Validation("hero description must not be empty".into()));
        }
        Ok(())
    }

    /// Display form. `None` only for an entry with a blank name.
    pub fn to_candidate(&self) -> Option<Candidate> {
        let mut candidate = Candidate::new(SourceKind::Custom, &self.name)?
            .with_summary(self.summary.trim())
            .with_image(self.image_url.clone());
        for (key, value) in &self.extra {
            candidate = candidate.with_attr(key, Some(value.clone()));
        }
        Some(candidate)
    }

    /// Lower-cased, trimmed lookup key.
    pub fn key(&self) -> String {
        normalize(&self.name)
    }
}

/// Case-fold and trim a name for comparison.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

// ── EntryStore ────────────────────────────────────────────────────────────────

/// Pluggable custom entry store.
///
/// Implementations are `Send + Sync` and shared behind `Arc`. Reads never
/// observe a half-applied append.
pub trait EntryStore: Send + Sync {
    /// Backend name for log lines (e.g. `"json_file"`).
    fn store_type(&self) -> &str;

    /// First entry whose name equals `name`, ignoring case.
    fn lookup_exact(&self, name: &str) -> Result<Option<CustomEntry>, AppError>;

    /// All entries whose name contains `query`, ignoring case, in insertion order.
    fn lookup_substring(&self, query: &str) -> Result<Vec<CustomEntry>, AppError>;

    /// Validate and add `entry`. Durable before returning.
    fn append(&self, entry: CustomEntry) -> Result<(), AppError>;

    /// Full snapshot in insertion order.
    fn list_all(&self) -> Result<Vec<CustomEntry>, AppError>;
}

// ── shared matching ───────────────────────────────────────────────────────────

fn find_exact(entries: &[CustomEntry], name: &str) -> Option<CustomEntry> {
    let key = normalize(name);
    if key.is_empty() {
        return None;
    }
    entries.iter().find(|e| e.key() == key).cloned()
}

fn find_substring(entries: &[CustomEntry], query: &str) -> Vec<CustomEntry> {
    let needle = normalize(query);
    if needle.is_empty() {
        return Vec::new();
    }
    entries
        .iter()
        .filter(|e| e.key().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<CustomEntry> {
        vec![
            CustomEntry::new("Batman", "The Dark Knight"),
            CustomEntry::new("Batgirl", "Barbara Gordon"),
            CustomEntry::new("Superman", "Man of Steel"),
        ]
    }

    #[test]
    fn exact_is_case_insensitive() {
        let found = find_exact(&sample(), "  bAtMaN ").unwrap();
        assert_eq!(found.summary, "The Dark Knight");
    }

    #[test]
    fn exact_does_not_match_prefix() {
        assert!(find_exact(&sample(), "Bat").is_none());
    }

    #[test]
    fn substring_keeps_insertion_order() {
        let names: Vec<_> = find_substring(&sample(), "BAT")
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Batman", "Batgirl"]);
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(find_substring(&sample(), "   ").is_empty());
        assert!(find_exact(&sample(), "").is_none());
    }

    #[test]
    fn validate_requires_name_and_summary() {
        assert!(CustomEntry::new("", "x").validate().is_err());
        assert!(CustomEntry::new("Foo", " ").validate().is_err());
        assert!(CustomEntry::new("Foo", "A hero").validate().is_ok());
    }

    #[test]
    fn to_candidate_carries_extra_fields() {
        let mut entry = CustomEntry::new("Foo", " A hero ").with_image("http://img");
        entry.extra.insert("power".into(), "flight".into());
        let c = entry.to_candidate().unwrap();
        assert_eq!(c.kind(), SourceKind::Custom);
        assert_eq!(c.summary, "A hero");
        assert_eq!(c.attr("power"), Some("flight"));
        assert_eq!(c.image_url.as_deref(), Some("http://img"));
    }

    #[test]
    fn description_and_image_aliases_deserialize() {
        let e: CustomEntry =
            serde_json::from_str(r#"{"name":"Foo","description":"A hero","image":"http://img"}"#)
                .unwrap();
        assert_eq!(e.summary, "A hero");
        assert_eq!(e.image_url.as_deref(), Some("http://img"));
    }
}
