//! Row-store connectivity check.

use serde::Serialize;

use crate::error::LabError;
use crate::lessons::{EXERCISES_TABLE, LESSONS_TABLE};
use crate::rowstore::{RowStore, SelectQuery, Session};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthItem {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthReport {
    pub items: Vec<HealthItem>,
}

impl HealthReport {
    pub fn all_passed(&self) -> bool {
        self.items.iter().all(|i| i.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &HealthItem> {
        self.items.iter().filter(|i| !i.passed)
    }
}

fn failure_detail(err: &LabError) -> String {
    if err.is_transient() {
        format!("{} (transient, retry later)", err)
    } else {
        err.to_string()
    }
}

fn probe_table<R: RowStore + ?Sized>(store: &R, table: &str) -> HealthItem {
    let name = format!("table {}", table);
    match store.select(&SelectQuery::from(table).limit(1)) {
        Ok(rows) => HealthItem {
            name,
            passed: true,
            detail: format!("reachable, {} sample row(s)", rows.len()),
        },
        Err(e) => {
            tracing::warn!(table, "Health probe failed: {}", e);
            HealthItem {
                name,
                passed: false,
                detail: failure_detail(&e),
            }
        }
    }
}

/// Anonymous access passes; a lapsed session does not.
fn session_item(session: Option<Session>, now: i64) -> HealthItem {
    let (passed, detail) = match session {
        Some(session) if session.is_expired_at(now) => (
            false,
            format!("session for {} expired, sign in again", session.user_email),
        ),
        Some(session) => (true, format!("signed in as {}", session.user_email)),
        None => (true, "no active session (anonymous access)".to_string()),
    };
    HealthItem {
        name: "auth session".to_string(),
        passed,
        detail,
    }
}

/// Probe the lesson tables and the auth session.
///
/// Every probe runs even when an earlier one fails.
pub fn check<R: RowStore + ?Sized>(store: &R) -> HealthReport {
    let mut items = vec![
        probe_table(store, LESSONS_TABLE),
        probe_table(store, EXERCISES_TABLE),
    ];

    items.push(session_item(store.get_session(), chrono::Utc::now().timestamp()));

    HealthReport { items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowstore::InMemoryRowStore;
    use serde_json::json;

    #[test]
    fn test_healthy_store() {
        let store = InMemoryRowStore::new();
        store.add_table(LESSONS_TABLE, vec![json!({"id": 1}), json!({"id": 2})]);
        store.add_table(EXERCISES_TABLE, vec![]);

        let report = check(&store);
        assert!(report.all_passed());
        assert_eq!(report.items.len(), 3);
        assert_eq!(report.items[0].detail, "reachable, 1 sample row(s)");
        assert_eq!(report.items[1].detail, "reachable, 0 sample row(s)");
        assert!(report.items[2].detail.contains("anonymous"));
    }

    #[test]
    fn test_missing_table_fails_its_item_only() {
        let store = InMemoryRowStore::new();
        store.add_table(LESSONS_TABLE, vec![]);
        store.sign_up("ada@example.com", "pw").unwrap();

        let report = check(&store);
        assert!(!report.all_passed());
        let failures: Vec<&str> = report.failures().map(|i| i.name.as_str()).collect();
        assert_eq!(failures, vec!["table exercises"]);
        assert!(report.items[1].detail.contains("Not found"));
        assert_eq!(report.items[2].detail, "signed in as ada@example.com");
    }

    #[test]
    fn test_expired_session_fails() {
        let store = InMemoryRowStore::new();
        store.add_table(LESSONS_TABLE, vec![]);
        store.add_table(EXERCISES_TABLE, vec![]);
        store.restore_session(Session {
            access_token: "stale".to_string(),
            refresh_token: None,
            user_email: "ada@example.com".to_string(),
            expires_at: Some(chrono::Utc::now().timestamp() - 60),
        });

        let report = check(&store);
        let failures: Vec<&str> = report.failures().map(|i| i.name.as_str()).collect();
        assert_eq!(failures, vec!["auth session"]);
        assert_eq!(
            report.items[2].detail,
            "session for ada@example.com expired, sign in again"
        );
    }

    #[test]
    fn test_session_without_expiry_passes() {
        let session = Session {
            access_token: "t".to_string(),
            refresh_token: None,
            user_email: "ada@example.com".to_string(),
            expires_at: None,
        };
        assert!(session_item(Some(session), i64::MAX).passed);
    }

    #[test]
    fn test_transient_detail() {
        let err = LabError::Http {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(
            failure_detail(&err),
            "HTTP 503: unavailable (transient, retry later)"
        );
    }
}
