//! Key-value slot operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::store::{KeyValueStore, StoreResult};

impl Database {
    /// Read a slot.
    pub fn get_value(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row("SELECT value FROM key_value WHERE key = ?", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .map_err(Into::into)
    }

    /// Insert or replace a slot.
    pub fn set_value(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO key_value (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a slot.
    pub fn delete_value(&self, key: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM key_value WHERE key = ?", [key])?;
        Ok(rows_affected > 0)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.get_value(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        Ok(self.set_value(key, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_value("invoiceCounter").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let db = Database::open_in_memory().unwrap();
        db.set_value("invoiceCounter", "a").unwrap();
        db.set_value("invoiceCounter", "b").unwrap();
        assert_eq!(db.get_value("invoiceCounter").unwrap(), Some("b".into()));
    }

    #[test]
    fn test_delete_value() {
        let db = Database::open_in_memory().unwrap();
        db.set_value("k", "v").unwrap();
        assert!(db.delete_value("k").unwrap());
        assert!(!db.delete_value("k").unwrap());
        assert_eq!(db.get_value("k").unwrap(), None);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.db");

        {
            let mut db = Database::open(&path).unwrap();
            KeyValueStore::set(&mut db, "invoiceCounter", "{}").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(
            KeyValueStore::get(&db, "invoiceCounter").unwrap(),
            Some("{}".into())
        );
    }
}
