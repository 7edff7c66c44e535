//! v001 -- Initial schema creation.
//!
//! Creates the single `kv` table. The store deliberately mirrors the original
//! client's flat key/value contract rather than normalising queued actions
//! into rows: the queue snapshot is one JSON array overwritten wholesale on
//! every mutation.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL                -- ISO-8601 / RFC-3339
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
