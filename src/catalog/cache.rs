use std::collections::HashMap;

use crate::registry::HandlerApp;

/// Type identifier to capable applications, filled at most once per key.
///
/// There is no invalidation: a missing key means "not asked yet", never
/// "no handlers".
#[derive(Debug, Default)]
pub struct HandlerCache {
    entries: HashMap<String, Vec<HandlerApp>>,
}

impl HandlerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, type_identifier: &str) -> Option<&[HandlerApp]> {
        self.entries.get(type_identifier).map(Vec::as_slice)
    }

    pub fn contains(&self, type_identifier: &str) -> bool {
        self.entries.contains_key(type_identifier)
    }

    /// Store handlers for a type unless an entry already exists, returning
    /// whichever list is cached afterwards.
    pub fn insert(&mut self, type_identifier: impl Into<String>, handlers: Vec<HandlerApp>) -> &[HandlerApp] {
        self.entries.entry(type_identifier.into()).or_insert(handlers)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
