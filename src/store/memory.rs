//! `memory` store: entries live in process memory only.

use std::sync::RwLock;

use crate::error::AppError;
use super::{CustomEntry, EntryStore, find_exact, find_substring};

/// Ephemeral store with the same semantics as the file-backed one.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<CustomEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store. Entries are not validated.
    pub fn with_entries(entries: Vec<CustomEntry>) -> Self {
        Self { entries: RwLock::new(entries) }
    }
}

impl EntryStore for MemoryStore {
    fn store_type(&self) -> &str {
        "memory"
    }

    fn lookup_exact(&self, name: &str) -> Result<Option<CustomEntry>, AppError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))?;
        Ok(find_exact(&entries, name))
    }

    fn lookup_substring(&self, query: &str) -> Result<Vec<CustomEntry>, AppError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))?;
        Ok(find_substring(&entries, query))
    }

    fn append(&self, entry: CustomEntry) -> Result<(), AppError> {
        entry.validate()?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))?;
        entries.push(entry);
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<CustomEntry>, AppError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))?;
        Ok(entries.clone())
    }
}
