//! Persistence for the offline action queue.
//!
//! The full queue is stored as one JSON array under the `offlineActions`
//! key and overwritten wholesale on every mutation. Writes are last-write-wins
//! on the whole collection; concurrent processes are not coordinated.

use unicon_shared::constants::KEY_OFFLINE_ACTIONS;
use unicon_shared::QueuedAction;

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Overwrite the persisted queue snapshot with `actions`.
    pub fn save_actions(&self, actions: &[QueuedAction]) -> Result<()> {
        let json = serde_json::to_string(actions)?;
        self.set_value(KEY_OFFLINE_ACTIONS, &json)
    }

    /// Load the persisted queue snapshot.
    ///
    /// A missing key yields an empty queue. So does a snapshot that no longer
    /// parses: a corrupt value must never take the whole client down, it is
    /// logged and discarded.
    pub fn load_actions(&self) -> Result<Vec<QueuedAction>> {
        let Some(json) = self.get_value(KEY_OFFLINE_ACTIONS)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&json) {
            Ok(actions) => Ok(actions),
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed offline queue snapshot");
                Ok(Vec::new())
            }
        }
    }

    /// Drop the persisted queue snapshot entirely.
    pub fn clear_actions(&self) -> Result<()> {
        self.delete_value(KEY_OFFLINE_ACTIONS)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicon_shared::ActionKind;

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("queue.db")).unwrap();
        (db, dir)
    }

    #[test]
    fn save_load_round_trip() {
        let (db, _dir) = test_db();

        let actions = vec![
            QueuedAction::new(ActionKind::Post, serde_json::json!({ "body": "a" })),
            QueuedAction::new(ActionKind::Message, serde_json::json!({ "body": "b" }))
                .with_user("u-1"),
        ];

        db.save_actions(&actions).unwrap();
        let loaded = db.load_actions().unwrap();
        assert_eq!(loaded, actions);
    }

    #[test]
    fn missing_snapshot_is_empty() {
        let (db, _dir) = test_db();
        assert!(db.load_actions().unwrap().is_empty());
    }

    #[test]
    fn malformed_snapshot_degrades_to_empty() {
        let (db, _dir) = test_db();

        db.set_value(KEY_OFFLINE_ACTIONS, "{ not json ]").unwrap();
        assert!(db.load_actions().unwrap().is_empty());

        // A snapshot of the wrong shape is just as unusable.
        db.set_value(KEY_OFFLINE_ACTIONS, r#"{"id":"1"}"#).unwrap();
        assert!(db.load_actions().unwrap().is_empty());
    }

    #[test]
    fn clear_removes_snapshot() {
        let (db, _dir) = test_db();

        db.save_actions(&[QueuedAction::new(
            ActionKind::Sync,
            serde_json::json!({}),
        )])
        .unwrap();
        db.clear_actions().unwrap();

        assert_eq!(db.get_value(KEY_OFFLINE_ACTIONS).unwrap(), None);
    }
}
