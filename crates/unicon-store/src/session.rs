//! Session credential storage.
//!
//! The bearer token lives under the `token` key. Replay reads it at call
//! time rather than caching it, so a token refreshed by the login flow is
//! picked up by the very next replay attempt.

use unicon_shared::constants::KEY_SESSION_TOKEN;

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Store the session bearer token.
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.set_value(KEY_SESSION_TOKEN, token)
    }

    /// Read the current session bearer token, if any.
    pub fn token(&self) -> Result<Option<String>> {
        self.get_value(KEY_SESSION_TOKEN)
    }

    /// Remove the session bearer token. Returns whether one was stored.
    pub fn clear_token(&self) -> Result<bool> {
        self.delete_value(KEY_SESSION_TOKEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("session.db")).unwrap();

        assert_eq!(db.token().unwrap(), None);

        db.set_token("jwt-abc").unwrap();
        assert_eq!(db.token().unwrap().as_deref(), Some("jwt-abc"));

        assert!(db.clear_token().unwrap());
        assert_eq!(db.token().unwrap(), None);
    }
}
