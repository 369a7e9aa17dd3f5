//! Playground state and the run pipeline.
//!
//! Each submission goes Validating -> Rejected, or Validating -> Dispatching
//! -> Completed. It runs synchronously to one of those ends. Only completed
//! runs reach the history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

use crate::classifier::Classifier;
use crate::error::{PlaygroundError, PlaygroundResult};
use crate::history::QueryHistory;
use crate::plan::execution_plan;
use crate::saved::{load_saved_queries, save_query, SavedQuery};
use crate::storage::KeyValueStore;
use crate::validator::{validate, ValidationResult};
use crate::value::ResultSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
}

/// One completed run, as shown to the user and kept in history
#[derive(Debug, Clone, Serialize)]
pub struct QueryExecution {
    pub query: String,
    pub scenario: &'static str,
    pub results: ResultSet,
    pub warnings: Vec<String>,
    pub execution_time_ms: f64,
    pub timestamp: DateTime<Utc>,
    pub status: ExecutionStatus,
}

/// Owns everything a playground session mutates.
pub struct Playground<S: KeyValueStore> {
    store: S,
    classifier: &'static Classifier,
    history: QueryHistory,
    saved: Vec<SavedQuery>,
}

impl<S: KeyValueStore> Playground<S> {
    /// Create a playground, loading saved queries from `store`
    pub fn new(store: S) -> Self {
        let saved = load_saved_queries(&store);
        tracing::debug!(count = saved.len(), "Loaded saved queries");
        Self {
            store,
            classifier: Classifier::standard(),
            history: QueryHistory::default(),
            saved,
        }
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = QueryHistory::with_capacity(capacity);
        self
    }

    pub fn with_classifier(mut self, classifier: &'static Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn validate(&self, query: &str) -> ValidationResult {
        validate(query)
    }

    pub fn classify(&self, query: &str) -> ResultSet {
        self.classifier.classify(query)
    }

    pub fn execution_plan(&self, query: &str) -> String {
        execution_plan(query)
    }

    /// Validate, classify, time and record a query.
    ///
    /// A query with hard validation errors is returned as
    /// [`PlaygroundError::Rejected`] and leaves history untouched.
    pub fn run(&mut self, query: &str) -> PlaygroundResult<QueryExecution> {
        let start = Instant::now();

        let validation = validate(query);
        if !validation.is_well_formed() {
            tracing::debug!(query, "Query rejected by validation");
            return Err(PlaygroundError::Rejected(validation));
        }

        let classification = self.classifier.classify_detailed(query);
        let execution_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let execution = QueryExecution {
            query: query.to_string(),
            scenario: classification.scenario,
            results: classification.results,
            warnings: validation.warnings().map(str::to_string).collect(),
            execution_time_ms,
            timestamp: Utc::now(),
            status: ExecutionStatus::Success,
        };
        tracing::debug!(
            scenario = execution.scenario,
            rows = execution.results.len(),
            "Query executed in {:.3}ms",
            execution_time_ms
        );

        self.history.append(execution.clone());
        Ok(execution)
    }

    /// Bookmark a query under `name` and persist the full list
    pub fn save(&mut self, name: &str, query: &str) -> PlaygroundResult<()> {
        save_query(&mut self.store, &mut self.saved, name, query)
    }

    pub fn saved_queries(&self) -> &[SavedQuery] {
        &self.saved
    }

    /// Most recently saved query with this name
    pub fn find_saved(&self, name: &str) -> Option<&SavedQuery> {
        let name = name.trim();
        self.saved.iter().rev().find(|q| q.name == name)
    }

    pub fn history(&self) -> &QueryHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
