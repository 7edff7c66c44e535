//! Raw key/value helpers over the `kv` table.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Read the value stored under `key`, if any.
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove `key`. Returns whether a value was actually deleted.
    pub fn delete_value(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("kv.db")).unwrap();
        (db, dir)
    }

    #[test]
    fn set_get_delete() {
        let (db, _dir) = test_db();

        assert_eq!(db.get_value("missing").unwrap(), None);

        db.set_value("greeting", "hello").unwrap();
        assert_eq!(db.get_value("greeting").unwrap().as_deref(), Some("hello"));

        db.set_value("greeting", "bonjour").unwrap();
        assert_eq!(
            db.get_value("greeting").unwrap().as_deref(),
            Some("bonjour")
        );

        assert!(db.delete_value("greeting").unwrap());
        assert!(!db.delete_value("greeting").unwrap());
        assert_eq!(db.get_value("greeting").unwrap(), None);
    }
}
