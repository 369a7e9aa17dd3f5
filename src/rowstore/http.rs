//! HTTP client for the hosted row-store.
//!
//! Tables are served under `/rest/v1/{table}` with filters as query
//! parameters (`column=op.value`), and password auth under `/auth/v1`.

use parking_lot::RwLock;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    ChangeCallback, ChangeEvent, ChangeKind, Filter, Row, RowStore, SelectQuery, Session,
    SubscriptionHandle, Subscribers,
};
use crate::config::RowStoreSettings;
use crate::error::{LabError, LabResult};

/// Token response from the auth endpoints
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<AuthUser>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    email: Option<String>,
}

pub struct HttpRowStore {
    client: Client,
    base_url: String,
    api_key: String,
    session: RwLock<Option<Session>>,
    subscribers: Subscribers,
}

impl HttpRowStore {
    pub fn new(settings: &RowStoreSettings) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            session: RwLock::new(None),
            subscribers: Subscribers::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Add the API key and bearer token. The session token wins over the key.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .session
            .read()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.api_key.clone());
        request.header("apikey", &self.api_key).bearer_auth(token)
    }

    fn send(&self, request: RequestBuilder) -> LabResult<Response> {
        let response = self.authorize(request).send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let message = error_message(&body);
        tracing::debug!(status = status.as_u16(), %message, "Row-store request failed");
        match status.as_u16() {
            401 | 403 => Err(LabError::Auth(message)),
            404 => Err(LabError::NotFound(message)),
            code => Err(LabError::Http {
                status: code,
                message,
            }),
        }
    }

    fn notify_all(&self, table: &str, kind: ChangeKind, rows: &[Row]) {
        for row in rows {
            self.subscribers.notify(&ChangeEvent {
                table: table.to_string(),
                kind,
                row: row.clone(),
            });
        }
    }

    fn store_session(&self, response: Response, fallback_email: &str) -> LabResult<Session> {
        let token: TokenResponse = response.json()?;
        let session = session_from_token(token, fallback_email)?;
        *self.session.write() = Some(session.clone());
        tracing::info!(email = %session.user_email, "Row-store session started");
        Ok(session)
    }
}

/// Query parameters for a table read
pub(crate) fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let select = if query.columns.is_empty() {
        "*".to_string()
    } else {
        query.columns.join(",")
    };
    params.push(("select".to_string(), select));
    params.extend(filter_params(&query.filters));
    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

pub(crate) fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| {
            (
                f.column.clone(),
                format!("{}.{}", f.op.as_str(), f.value_param()),
            )
        })
        .collect()
}

/// Best human-readable message from an error body
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    if body.is_empty() {
        "empty response".to_string()
    } else {
        body.to_string()
    }
}

fn session_from_token(token: TokenResponse, fallback_email: &str) -> LabResult<Session> {
    let access_token = token
        .access_token
        .ok_or_else(|| LabError::Auth("no session returned; confirm the email first".to_string()))?;
    let expires_at = token.expires_at.or_else(|| {
        token
            .expires_in
            .map(|secs| chrono::Utc::now().timestamp() + secs)
    });
    let user_email = token
        .user
        .and_then(|u| u.email)
        .unwrap_or_else(|| fallback_email.to_string());
    Ok(Session {
        access_token,
        refresh_token: token.refresh_token,
        user_email,
        expires_at,
    })
}

fn rows_from(value: Value) -> LabResult<Vec<Row>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                other => Err(LabError::Decode(format!("expected a row object, got {}", other))),
            })
            .collect(),
        Value::Object(row) => Ok(vec![row]),
        other => Err(LabError::Decode(format!("expected rows, got {}", other))),
    }
}

impl RowStore for HttpRowStore {
    fn select(&self, query: &SelectQuery) -> LabResult<Vec<Row>> {
        let request = self
            .client
            .get(self.table_url(&query.table))
            .query(&select_params(query));
        let response = self.send(request)?;
        rows_from(response.json()?)
    }

    fn insert(&self, table: &str, row: Row) -> LabResult<Row> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&row);
        let rows = rows_from(self.send(request)?.json()?)?;
        self.notify_all(table, ChangeKind::Insert, &rows);
        rows.into_iter()
            .next()
            .ok_or_else(|| LabError::Decode("insert returned no rows".to_string()))
    }

    fn update(&self, table: &str, filters: &[Filter], patch: Row) -> LabResult<Vec<Row>> {
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&filter_params(filters))
            .header("Prefer", "return=representation")
            .json(&patch);
        let rows = rows_from(self.send(request)?.json()?)?;
        self.notify_all(table, ChangeKind::Update, &rows);
        Ok(rows)
    }

    fn delete(&self, table: &str, filters: &[Filter]) -> LabResult<()> {
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&filter_params(filters))
            .header("Prefer", "return=representation");
        let response = self.send(request)?;
        let removed = response
            .json::<Value>()
            .ok()
            .map(rows_from)
            .and_then(Result::ok)
            .unwrap_or_default();
        self.notify_all(table, ChangeKind::Delete, &removed);
        Ok(())
    }

    fn rpc(&self, function: &str, args: Value) -> LabResult<Value> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        let response = self.send(self.client.post(url).json(&args))?;
        let text = response.text()?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn sign_up(&self, email: &str, password: &str) -> LabResult<Session> {
        let request = self
            .client
            .post(self.auth_url("signup"))
            .json(&json!({ "email": email, "password": password }));
        let response = self.send(request)?;
        self.store_session(response, email)
    }

    fn sign_in(&self, email: &str, password: &str) -> LabResult<Session> {
        let request = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let response = self.send(request)?;
        self.store_session(response, email)
    }

    fn sign_out(&self) -> LabResult<()> {
        if self.session.read().is_some() {
            let result = self.send(self.client.post(self.auth_url("logout")));
            if let Err(e) = result {
                tracing::warn!("Remote sign-out failed: {}", e);
            }
        }
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

    fn store() -> HttpRowStore {
        HttpRowStore::new(&RowStoreSettings {
            url: "https://db.example.com/".to_string(),
            api_key: "anon-key".to_string(),
        })
    }

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn test_urls() {
        let store = store();
        assert_eq!(store.base_url(), "https://db.example.com");
        assert_eq!(
            store.table_url("lessons"),
            "https://db.example.com/rest/v1/lessons"
        );
        assert_eq!(
            store.auth_url("token"),
            "https://db.example.com/auth/v1/token"
        );
    }

    #[test]
    fn test_select_params() {
        let query = SelectQuery::from("lessons")
            .columns(&["id", "title"])
            .filter(Filter::eq("is_published", true))
            .filter(Filter::new("title", FilterOp::Like, "%join%"))
            .order_by("order_index", true)
            .order_by("id", false)
            .limit(10);
        let params = select_params(&query);
        assert_eq!(
            pairs(&params),
            vec![
                ("select", "id,title"),
                ("is_published", "eq.true"),
                ("title", "like.*join*"),
                ("order", "order_index.asc,id.desc"),
                ("limit", "10"),
            ]
        );
    }

    #[test]
    fn test_select_params_defaults_to_all_columns() {
        let params = select_params(&SelectQuery::from("exercises"));
        assert_eq!(pairs(&params), vec![("select", "*")]);
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"message":"relation missing"}"#), "relation missing");
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login"}"#),
            "Invalid login"
        );
        assert_eq!(error_message("plain text"), "plain text");
        assert_eq!(error_message(""), "empty response");
    }

    #[test]
    fn test_session_from_token() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "abc",
            "refresh_token": "def",
            "expires_at": 1700000000,
            "user": {"email": "ada@example.com"}
        }))
        .unwrap();
        let session = session_from_token(token, "other@example.com").unwrap();
        assert_eq!(session.access_token, "abc");
        assert_eq!(session.refresh_token.as_deref(), Some("def"));
        assert_eq!(session.user_email, "ada@example.com");
        assert_eq!(session.expires_at, Some(1700000000));

        // Sign-up awaiting email confirmation returns a user but no token
        let token: TokenResponse =
            serde_json::from_value(json!({"user": {"email": "ada@example.com"}})).unwrap();
        assert!(matches!(
            session_from_token(token, "ada@example.com"),
            Err(LabError::Auth(_))
        ));
    }

    #[test]
    fn test_rows_from() {
        let rows = rows_from(json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows_from(json!({"id": 1})).unwrap().len(), 1);
        assert!(rows_from(json!([1, 2])).is_err());
        assert!(rows_from(json!("nope")).is_err());
    }

    #[test]
    fn test_no_session_before_sign_in() {
        let store = store();
        assert!(store.get_session().is_none());
        // Signing out without a session makes no request
        store.sign_out().unwrap();
    }
}
