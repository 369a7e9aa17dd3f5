//! In-memory row-store for tests and offline demos.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::Arc;

use super::{
    compare_values, ChangeCallback, ChangeEvent, ChangeKind, Filter, Row, RowStore, SelectQuery,
    Session, SubscriptionHandle, Subscribers,
};
use crate::error::{LabError, LabResult};

type RpcFunction = Arc<dyn Fn(&Value) -> LabResult<Value> + Send + Sync>;

#[derive(Default)]
pub struct InMemoryRowStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    users: RwLock<HashMap<String, String>>,
    session: RwLock<Option<Session>>,
    functions: RwLock<HashMap<String, RpcFunction>>,
    subscribers: Subscribers,
    next_id: AtomicI64,
}

impl InMemoryRowStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table with rows. Rows keep the given `id` values.
    pub fn add_table(&self, name: &str, rows: Vec<Value>) {
        let rows: Vec<Row> = rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        let max_id = rows
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_i64))
            .max()
            .unwrap_or(0);
        self.next_id.fetch_max(max_id, AtomicOrdering::SeqCst);
        self.tables.write().insert(name.to_string(), rows);
    }

    /// Register a stored procedure for [`RowStore::rpc`]
    pub fn register_function<F>(&self, name: &str, function: F)
    where
        F: Fn(&Value) -> LabResult<Value> + Send + Sync + 'static,
    {
        self.functions
            .write()
            .insert(name.to_string(), Arc::new(function));
    }

    /// Install a previously issued session as the current one
    pub fn restore_session(&self, session: Session) {
        *self.session.write() = Some(session);
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables.read().get(table).map(Vec::len).unwrap_or(0)
    }

    fn missing_table(table: &str) -> LabError {
        LabError::NotFound(format!("table '{}'", table))
    }

    fn notify(&self, table: &str, kind: ChangeKind, row: &Row) {
        self.subscribers.notify(&ChangeEvent {
            table: table.to_string(),
            kind,
            row: row.clone(),
        });
    }

    fn session_for(email: &str) -> Session {
        Session {
            access_token: format!("token-{}", uuid::Uuid::new_v4()),
            refresh_token: None,
            user_email: email.to_string(),
            expires_at: Some(chrono::Utc::now().timestamp() + 3600),
        }
    }
}

impl RowStore for InMemoryRowStore {
    fn select(&self, query: &SelectQuery) -> LabResult<Vec<Row>> {
        let tables = self.tables.read();
        let rows = tables
            .get(&query.table)
            .ok_or_else(|| Self::missing_table(&query.table))?;

        let mut matched: Vec<Row> = rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| f.matches(row)))
            .cloned()
            .collect();

        if !query.order.is_empty() {
            matched.sort_by(|a, b| {
                for order in &query.order {
                    let left = a.get(&order.column).unwrap_or(&Value::Null);
                    let right = b.get(&order.column).unwrap_or(&Value::Null);
                    let ord = compare_values(left, right).unwrap_or(std::cmp::Ordering::Equal);
                    let ord = if order.ascending { ord } else { ord.reverse() };
                    if ord != std::cmp::Ordering::Equal {
                        return ord;
                    }
                }
                std::cmp::Ordering::Equal
            });
        }

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        if !query.columns.is_empty() {
            matched = matched
                .into_iter()
                .map(|row| {
                    query
                        .columns
                        .iter()
                        .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                        .collect()
                })
                .collect();
        }

        Ok(matched)
    }

    fn insert(&self, table: &str, mut row: Row) -> LabResult<Row> {
        if !row.contains_key("id") {
            let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            row.insert("id".to_string(), Value::from(id));
        }
        {
            let mut tables = self.tables.write();
            let rows = tables
                .get_mut(table)
                .ok_or_else(|| Self::missing_table(table))?;
            rows.push(row.clone());
        }
        self.notify(table, ChangeKind::Insert, &row);
        Ok(row)
    }

    fn update(&self, table: &str, filters: &[Filter], patch: Row) -> LabResult<Vec<Row>> {
        let updated: Vec<Row> = {
            let mut tables = self.tables.write();
            let rows = tables
                .get_mut(table)
                .ok_or_else(|| Self::missing_table(table))?;
            rows.iter_mut()
                .filter(|row| filters.iter().all(|f| f.matches(row)))
                .map(|row| {
                    for (k, v) in &patch {
                        row.insert(k.clone(), v.clone());
                    }
                    row.clone()
                })
                .collect()
        };
        for row in &updated {
            self.notify(table, ChangeKind::Update, row);
        }
        Ok(updated)
    }

    fn delete(&self, table: &str, filters: &[Filter]) -> LabResult<()> {
        let removed: Vec<Row> = {
            let mut tables = self.tables.write();
            let rows = tables
                .get_mut(table)
                .ok_or_else(|| Self::missing_table(table))?;
            let (removed, kept): (Vec<Row>, Vec<Row>) = rows
                .drain(..)
                .partition(|row| filters.iter().all(|f| f.matches(row)));
            *rows = kept;
            removed
        };
        for row in &removed {
            self.notify(table, ChangeKind::Delete, row);
        }
        Ok(())
    }

    fn rpc(&self, function: &str, args: Value) -> LabResult<Value> {
        let callable = self
            .functions
            .read()
            .get(function)
            .cloned()
            .ok_or_else(|| LabError::NotFound(format!("function '{}'", function)))?;
        callable(&args)
    }

    fn sign_up(&self, email: &str, password: &str) -> LabResult<Session> {
        {
            let mut users = self.users.write();
            if users.contains_key(email) {
                return Err(LabError::Auth("User already registered".to_string()));
            }
            users.insert(email.to_string(), password.to_string());
        }
        let session = Self::session_for(email);
        *self.session.write() = Some(session.clone());
        Ok(session)
    }

    fn sign_in(&self, email: &str, password: &str) -> LabResult<Session> {
        let valid = self
            .users
            .read()
            .get(email)
            .map(|stored| stored == password)
            .unwrap_or(false);
        if !valid {
            return Err(LabError::Auth("Invalid login credentials".to_string()));
        }
        let session = Self::session_for(email);
        *self.session.write() = Some(session.clone());
        Ok(session)
    }

    fn sign_out(&self) -> LabResult<()> {
        *self.session.write() = None;
        Ok(())
    }

    fn get_session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    fn subscribe(&self, table: &str, callback: ChangeCallback) -> SubscriptionHandle {
        self.subscribers.add(table, callback)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.subscribers.remove(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowstore::FilterOp;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn store() -> InMemoryRowStore {
        let store = InMemoryRowStore::new();
        store.add_table(
            "lessons",
            vec![
                json!({"id": 1, "title": "SELECT basics", "order_index": 2, "is_published": true}),
                json!({"id": 2, "title": "Joins", "order_index": 3, "is_published": false}),
                json!({"id": 3, "title": "What is SQL", "order_index": 1, "is_published": true}),
            ],
        );
        store
    }

    #[test]
    fn test_select_filter_order_limit_projection() {
        let store = store();
        let query = SelectQuery::from("lessons")
            .columns(&["title"])
            .filter(Filter::eq("is_published", true))
            .order_by("order_index", true)
            .limit(5);
        let rows = store.select(&query).unwrap();
        assert_eq!(
            rows,
            vec![row(json!({"title": "What is SQL"})), row(json!({"title": "SELECT basics"}))]
        );

        let rows = store
            .select(&SelectQuery::from("lessons").order_by("id", false).limit(1))
            .unwrap();
        assert_eq!(rows[0]["id"], 3);
    }

    #[test]
    fn test_unknown_table() {
        let store = store();
        let err = store.select(&SelectQuery::from("nope")).unwrap_err();
        assert!(matches!(err, LabError::NotFound(_)));
        assert!(store.insert("nope", Row::new()).is_err());
    }

    #[test]
    fn test_insert_assigns_ids_after_existing() {
        let store = store();
        let inserted = store
            .insert("lessons", row(json!({"title": "Indexes"})))
            .unwrap();
        assert_eq!(inserted["id"], 4);
        assert_eq!(store.row_count("lessons"), 4);
    }

    #[test]
    fn test_update_and_delete() {
        let store = store();
        let updated = store
            .update(
                "lessons",
                &[Filter::new("order_index", FilterOp::Gte, 2)],
                row(json!({"is_published": true})),
            )
            .unwrap();
        assert_eq!(updated.len(), 2);

        let published = store
            .select(&SelectQuery::from("lessons").filter(Filter::eq("is_published", true)))
            .unwrap();
        assert_eq!(published.len(), 3);

        store.delete("lessons", &[Filter::eq("id", 2)]).unwrap();
        assert_eq!(store.row_count("lessons"), 2);
    }

    #[test]
    fn test_change_feed() {
        let store = store();
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let sink = Arc::clone(&events);
        let handle = store.subscribe(
            "lessons",
            Box::new(move |event: &ChangeEvent| sink.lock().push(event.kind)),
        );

        store.insert("lessons", row(json!({"title": "x"}))).unwrap();
        store
            .update("lessons", &[Filter::eq("title", "x")], row(json!({"title": "y"})))
            .unwrap();
        store.delete("lessons", &[Filter::eq("title", "y")]).unwrap();
        assert_eq!(
            *events.lock(),
            vec![ChangeKind::Insert, ChangeKind::Update, ChangeKind::Delete]
        );

        assert!(store.unsubscribe(handle));
        store.insert("lessons", row(json!({"title": "z"}))).unwrap();
        assert_eq!(events.lock().len(), 3);
    }

    #[test]
    fn test_auth_flow() {
        let store = InMemoryRowStore::new();
        assert!(store.get_session().is_none());

        let session = store.sign_up("ada@example.com", "secret").unwrap();
        assert_eq!(session.user_email, "ada@example.com");
        assert!(store.sign_up("ada@example.com", "again").is_err());

        store.sign_out().unwrap();
        assert!(store.get_session().is_none());

        assert!(matches!(
            store.sign_in("ada@example.com", "wrong"),
            Err(LabError::Auth(_))
        ));
        store.sign_in("ada@example.com", "secret").unwrap();
        assert_eq!(store.get_session().unwrap().user_email, "ada@example.com");
    }

    #[test]
    fn test_restore_session() {
        let store = InMemoryRowStore::new();
        store.restore_session(Session {
            access_token: "old".to_string(),
            refresh_token: None,
            user_email: "ada@example.com".to_string(),
            expires_at: Some(100),
        });
        let session = store.get_session().unwrap();
        assert_eq!(session.access_token, "old");
        assert!(session.is_expired_at(100));
        assert!(!session.is_expired_at(99));

        store.sign_out().unwrap();
        assert!(store.get_session().is_none());
    }

    #[test]
    fn test_rpc() {
        let store = InMemoryRowStore::new();
        store.register_function("lesson_count", |_| Ok(json!(12)));
        assert_eq!(store.rpc("lesson_count", json!({})).unwrap(), json!(12));
        assert!(matches!(
            store.rpc("missing", Value::Null),
            Err(LabError::NotFound(_))
        ));
    }
}
