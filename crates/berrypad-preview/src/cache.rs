//! Per-document content cache.
//!
//! Holds the last raw content seen for each open document so switching tabs
//! repaints the preview straight from memory.

use std::collections::HashMap;

use crate::types::DocumentId;

#[derive(Debug, Default, Clone)]
pub struct DocumentCache {
    entries: HashMap<DocumentId, String>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` for `id`, returning the previous content.
    pub fn put(&mut self, id: DocumentId, content: impl Into<String>) -> Option<String> {
        self.entries.insert(id, content.into())
    }

    pub fn get(&self, id: &DocumentId) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn evict(&mut self, id: &DocumentId) -> Option<String> {
        self.entries.remove(id)
    }

    /// Move the entry for `from` to `to`. Returns false if `from` had none.
    ///
    /// An existing entry under `to` is replaced.
    pub fn rename(&mut self, from: &DocumentId, to: DocumentId) -> bool {
        match self.entries.remove(from) {
            Some(content) => {
                self.entries.insert(to, content);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
