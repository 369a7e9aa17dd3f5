//! Bounded execution history, most recent first.

use std::collections::VecDeque;

use crate::playground::QueryExecution;

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub struct QueryHistory {
    entries: VecDeque<QueryExecution>,
    capacity: usize,
}

impl QueryHistory {
    /// A capacity of zero is raised to one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push to the front, evicting the oldest entries beyond capacity
    pub fn append(&mut self, execution: QueryExecution) {
        self.entries.push_front(execution);
        self.entries.truncate(self.capacity);
    }

    pub fn latest(&self) -> Option<&QueryExecution> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryExecution> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for QueryHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}
