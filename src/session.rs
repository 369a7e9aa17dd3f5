//! Cached sign-in state.
//!
//! Only a flag and the user's email are kept locally. Tokens stay with the
//! row-store client.

use querylab_core::KeyValueStore;

pub const IS_AUTHENTICATED_KEY: &str = "isAuthenticated";
pub const USER_EMAIL_KEY: &str = "userEmail";

pub struct SessionFlags<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionFlags<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn sign_in(&mut self, email: &str) {
        self.store.set(IS_AUTHENTICATED_KEY, "true");
        self.store.set(USER_EMAIL_KEY, email);
        tracing::info!(email, "Signed in");
    }

    pub fn sign_out(&mut self) {
        self.store.set(IS_AUTHENTICATED_KEY, "false");
        self.store.remove(USER_EMAIL_KEY);
        tracing::info!("Signed out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get(IS_AUTHENTICATED_KEY).as_deref() == Some("true")
    }

    /// Email of the signed-in user, if any
    pub fn user_email(&self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        self.store.get(USER_EMAIL_KEY).filter(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querylab_core::InMemoryStore;

    #[test]
    fn test_sign_in_and_out() {
        let mut session = SessionFlags::new(InMemoryStore::new());
        assert!(!session.is_authenticated());
        assert_eq!(session.user_email(), None);

        session.sign_in("ada@example.com");
        assert!(session.is_authenticated());
        assert_eq!(session.user_email().as_deref(), Some("ada@example.com"));

        session.sign_out();
        assert!(!session.is_authenticated());
        assert_eq!(session.user_email(), None);
    }

    #[test]
    fn test_stale_email_without_flag_is_ignored() {
        let store = InMemoryStore::with_values([(USER_EMAIL_KEY, "old@example.com")]);
        let session = SessionFlags::new(store);
        assert_eq!(session.user_email(), None);
    }
}
