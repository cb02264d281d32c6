//! Completion data model: entries and result sets.

use std::sync::Arc;

/// A filesystem path string as produced by enumeration.
///
/// Directory-ness is not stored; consumers re-check on demand.
pub type Entry = Arc<str>;

/// Ordered, capped list of completions handed to the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    items: Vec<String>,
}

impl ResultSet {
    #[must_use]
    pub const fn new(items: Vec<String>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn position(&self, item: &str) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}
