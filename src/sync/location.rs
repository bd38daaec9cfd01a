//! Location Port
//!
//! The page address as seen by the synchronizer: read the current query,
//! replace it in place without adding a history entry.

use crate::codec::QueryMap;

/// Page location the synchronizer reads and writes
pub trait Location {
    /// Current query of the page
    fn query(&self) -> QueryMap;

    /// Replace the query in place; must not create a history entry
    fn replace_query(&mut self, query: &QueryMap);
}

/// In-memory location, used by the CLI session and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryLocation {
    query: QueryMap,
    history: Vec<QueryMap>,
    replacements: usize,
}

impl MemoryLocation {
    pub fn new(query: QueryMap) -> Self {
        Self {
            history: vec![query.clone()],
            query,
            replacements: 0,
        }
    }

    /// Navigate to a new query, pushing a history entry like a pasted link
    pub fn navigate(&mut self, query: QueryMap) {
        self.history.push(query.clone());
        self.query = query;
    }

    /// Step back one history entry; returns false at the start of history
    pub fn back(&mut self) -> bool {
        if self.history.len() < 2 {
            return false;
        }
        self.history.pop();
        if let Some(previous) = self.history.last() {
            self.query = previous.clone();
        }
        true
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Number of in-place replacements performed
    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl Location for MemoryLocation {
    fn query(&self) -> QueryMap {
        self.query.clone()
    }

    fn replace_query(&mut self, query: &QueryMap) {
        self.query = query.clone();
        if let Some(current) = self.history.last_mut() {
            *current = query.clone();
        }
        self.replacements += 1;
    }
}
