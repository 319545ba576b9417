use crate::db::{open_db, SharedConnection};
use goldportal::storage::{LocalStorage, LocalStorageError};
use rusqlite::OptionalExtension;
use std::path::Path;

const LOCAL_STORAGE_CHANGELOG_0: &str = "
CREATE TABLE local_storage (
    scope TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (scope, key)
);
";

pub const LOCAL_STORAGE_CHANGELOGS: [&str; 1] = [LOCAL_STORAGE_CHANGELOG_0];

/// Scope of the items every client of the shop shares.
pub const SHARED_SCOPE: &str = "shared";

pub fn open_local_storage_db(db_dir: &Path) -> SharedConnection {
    open_db(db_dir, "local_storage", &LOCAL_STORAGE_CHANGELOGS)
}

/// Local storage of a single scope, either the shared one or a client's.
pub struct SqliteLocalStorage {
    conn: SharedConnection,
    scope: String,
}

impl SqliteLocalStorage {
    pub fn new(conn: SharedConnection, scope: &str) -> SqliteLocalStorage {
        SqliteLocalStorage {
            conn,
            scope: scope.to_string(),
        }
    }

    pub fn shared(conn: SharedConnection) -> SqliteLocalStorage {
        Self::new(conn, SHARED_SCOPE)
    }

    pub fn for_client(conn: SharedConnection, client_id: &str) -> SqliteLocalStorage {
        Self::new(conn, &format!("client:{client_id}"))
    }
}

fn backend_error(e: rusqlite::Error) -> LocalStorageError {
    LocalStorageError::BackendError {
        message: e.to_string(),
    }
}

impl LocalStorage for SqliteLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, LocalStorageError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT value FROM local_storage WHERE scope = ?1 AND key = ?2",
            (self.scope.as_str(), key),
            |row| row.get(0),
        )
        .optional()
        .map_err(backend_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), LocalStorageError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO local_storage (scope, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (scope, key) DO UPDATE SET value = excluded.value",
            (self.scope.as_str(), key, value),
        )
        .map_err(backend_error)?;

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), LocalStorageError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "DELETE FROM local_storage WHERE scope = ?1 AND key = ?2",
            (self.scope.as_str(), key),
        )
        .map_err(backend_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn conn() -> SharedConnection {
        open_in_memory("local_storage", &LOCAL_STORAGE_CHANGELOGS)
    }

    #[test]
    fn stores_and_replaces_items() {
        let storage = SqliteLocalStorage::shared(conn());

        assert_eq!(storage.get_item("customers").unwrap(), None);

        storage.set_item("customers", "[]").unwrap();
        storage.set_item("customers", "[1]").unwrap();

        assert_eq!(
            storage.get_item("customers").unwrap().as_deref(),
            Some("[1]")
        );
    }

    #[test]
    fn scopes_do_not_see_each_other() {
        let conn = conn();
        let alice = SqliteLocalStorage::for_client(conn.clone(), "a");
        let bob = SqliteLocalStorage::for_client(conn.clone(), "b");
        let shared = SqliteLocalStorage::shared(conn);

        alice.set_item("auth-storage", "{}").unwrap();

        assert_eq!(bob.get_item("auth-storage").unwrap(), None);
        assert_eq!(shared.get_item("auth-storage").unwrap(), None);
    }

    #[test]
    fn removing_missing_key_is_fine() {
        let storage = SqliteLocalStorage::shared(conn());
        storage.set_item("resetPasscodes", "{}").unwrap();

        storage.remove_item("resetPasscodes").unwrap();
        storage.remove_item("resetPasscodes").unwrap();

        assert_eq!(storage.get_item("resetPasscodes").unwrap(), None);
    }
}
