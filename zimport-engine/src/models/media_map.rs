//! Media Map: row identifier → created resource id and its media URLs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaMapEntry {
    pub identifier: String,
    pub resource_id: i64,
    /// Public URLs in order of attachment
    pub media_urls: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MediaMap {
    entries: HashMap<String, MediaMapEntry>,
}

impl MediaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry, replacing any earlier one for the same identifier
    pub fn insert(&mut self, entry: MediaMapEntry) {
        self.entries.insert(entry.identifier.clone(), entry);
    }

    pub fn get(&self, identifier: &str) -> Option<&MediaMapEntry> {
        self.entries.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaMapEntry> {
        self.entries.values()
    }
}
