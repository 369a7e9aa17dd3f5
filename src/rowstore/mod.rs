//! Hosted row-store collaborator.
//!
//! The learning site reads lessons and exercises from a backend-as-a-service
//! exposing table CRUD, RPC, password auth and change subscriptions. This
//! module defines that surface as the [`RowStore`] trait, with an HTTP client
//! and an in-memory fake behind it.
//!
//! Subscriptions are a local change feed: callbacks fire after this client's
//! own successful writes to the subscribed table.

pub mod http;
pub mod memory;

pub use http::HttpRowStore;
pub use memory::InMemoryRowStore;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::LabResult;

/// A table row as returned by the store
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// SQL LIKE with `%` and `_` wildcards
    Like,
    /// Identity check against null / true / false
    Is,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Like => "like",
            FilterOp::Is => "is",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(column: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }

    /// Whether `row` satisfies this filter. A missing column reads as null.
    pub fn matches(&self, row: &Row) -> bool {
        let actual = row.get(&self.column).unwrap_or(&Value::Null);
        match self.op {
            FilterOp::Eq | FilterOp::Is => values_equal(actual, &self.value),
            FilterOp::Neq => !values_equal(actual, &self.value),
            FilterOp::Gt => compare_values(actual, &self.value) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt => compare_values(actual, &self.value) == Some(Ordering::Less),
            FilterOp::Lte => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Like => match (actual.as_str(), self.value.as_str()) {
                (Some(text), Some(pattern)) => like_match(text, pattern),
                _ => false,
            },
        }
    }

    /// Render the filter value the way the REST surface expects it
    pub(crate) fn value_param(&self) -> String {
        match &self.value {
            Value::String(s) if self.op == FilterOp::Like => s.replace('%', "*"),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Table read: filters, projection, ordering and limit
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub filters: Vec<Filter>,
    pub columns: Vec<String>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filters: Vec::new(),
            columns: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Projection; no columns means all columns
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_email: String,
    /// Unix seconds
    pub expires_at: Option<i64>,
}

impl Session {
    /// A session without an expiry never lapses.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    pub row: Row,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(Uuid);

pub type ChangeCallback = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Operations the site consumes from the hosted backend.
pub trait RowStore {
    fn select(&self, query: &SelectQuery) -> LabResult<Vec<Row>>;

    /// Insert a row, returning it as stored
    fn insert(&self, table: &str, row: Row) -> LabResult<Row>;

    /// Patch every row matching all filters, returning the updated rows
    fn update(&self, table: &str, filters: &[Filter], patch: Row) -> LabResult<Vec<Row>>;

    fn delete(&self, table: &str, filters: &[Filter]) -> LabResult<()>;

    /// Call a stored procedure
    fn rpc(&self, function: &str, args: Value) -> LabResult<Value>;

    fn sign_up(&self, email: &str, password: &str) -> LabResult<Session>;

    fn sign_in(&self, email: &str, password: &str) -> LabResult<Session>;

    fn sign_out(&self) -> LabResult<()>;

    fn get_session(&self) -> Option<Session>;

    fn subscribe(&self, table: &str, callback: ChangeCallback) -> SubscriptionHandle;

    /// # Returns
    /// true if the handle was subscribed
    fn unsubscribe(&self, handle: SubscriptionHandle) -> bool;
}

type SharedCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Registry of change callbacks keyed by subscription handle
#[derive(Default)]
pub struct Subscribers {
    callbacks: RwLock<HashMap<SubscriptionHandle, (String, SharedCallback)>>,
}

impl Subscribers {
    pub fn add(&self, table: &str, callback: ChangeCallback) -> SubscriptionHandle {
        let handle = SubscriptionHandle(Uuid::new_v4());
        self.callbacks
            .write()
            .insert(handle, (table.to_string(), Arc::from(callback)));
        tracing::debug!(table, "Subscribed to changes");
        handle
    }

    pub fn remove(&self, handle: SubscriptionHandle) -> bool {
        self.callbacks.write().remove(&handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every callback subscribed to the event's table.
    ///
    /// The lock is released before callbacks run, so a callback may subscribe
    /// or unsubscribe.
    pub fn notify(&self, event: &ChangeEvent) {
        let targets: Vec<SharedCallback> = self
            .callbacks
            .read()
            .values()
            .filter(|(table, _)| *table == event.table)
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in targets {
            callback(event);
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Order two JSON scalars: null first, then booleans, numbers, strings
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(_), Value::Number(_)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ if rank(a) != rank(b) && rank(a) < 4 && rank(b) < 4 => Some(rank(a).cmp(&rank(b))),
        _ => None,
    }
}

/// SQL LIKE: `%` matches any run, `_` any single character
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((bp, bt)) = backtrack {
            p = bp + 1;
            t = bt + 1;
            backtrack = Some((bp, bt + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}
