//! Named query bookmarks persisted through a [`KeyValueStore`].
//!
//! The whole list is written under a single key on every save. There is no
//! merge with what another writer may have stored in the meantime.

use serde::{Deserialize, Serialize};

use crate::error::{PlaygroundError, PlaygroundResult};
use crate::storage::KeyValueStore;

/// Storage key holding the JSON array of saved queries
pub const SAVED_QUERIES_KEY: &str = "sqlPlaygroundSavedQueries";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedQuery {
    pub name: String,
    pub query: String,
}

/// Read saved queries from the store. Missing or malformed data yields an
/// empty list.
pub fn load_saved_queries<S: KeyValueStore + ?Sized>(store: &S) -> Vec<SavedQuery> {
    let Some(raw) = store.get(SAVED_QUERIES_KEY) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(queries) => queries,
        Err(e) => {
            tracing::warn!("Ignoring malformed saved queries: {}", e);
            Vec::new()
        }
    }
}

/// Append a saved query and persist the full list.
///
/// Fails with [`PlaygroundError::InvalidName`] when the name is blank, leaving
/// both `saved` and the store untouched.
pub(crate) fn save_query<S: KeyValueStore + ?Sized>(
    store: &mut S,
    saved: &mut Vec<SavedQuery>,
    name: &str,
    query: &str,
) -> PlaygroundResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PlaygroundError::InvalidName);
    }

    saved.push(SavedQuery {
        name: name.to_string(),
        query: query.to_string(),
    });

    match serde_json::to_string(saved) {
        Ok(json) => store.set(SAVED_QUERIES_KEY, &json),
        Err(e) => tracing::warn!("Could not serialize saved queries: {}", e),
    }
    tracing::debug!(name, "Saved query");
    Ok(())
}
