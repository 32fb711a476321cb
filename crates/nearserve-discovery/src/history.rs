use std::collections::VecDeque;

use chrono::Utc;

use nearserve_core::{SearchHistoryEntry, SearchQuery};

pub const HISTORY_CAPACITY: usize = 5;

/// Most-recent-first ring of completed searches. Lives only as long as the
/// session.
#[derive(Debug, Clone, Default)]
pub struct SearchHistory {
    entries: VecDeque<SearchHistoryEntry>,
}

impl SearchHistory {
    pub fn record(&mut self, query: SearchQuery, result_count: usize) {
        self.entries.push_front(SearchHistoryEntry {
            query,
            result_count,
            timestamp: Utc::now(),
        });
        self.entries.truncate(HISTORY_CAPACITY);
    }

    #[must_use]
    pub fn entries(&self) -> Vec<SearchHistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&SearchHistoryEntry> {
        self.entries.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
