pub mod data_service;
pub mod local_storage;

use log::info;
use rusqlite::Connection;
use std::fs::create_dir_all;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub type SharedConnection = Arc<Mutex<Connection>>;

/// Opens `<db_dir>/<name>.db` and brings it up to date with the changelogs.
pub fn open_db(db_dir: &Path, name: &str, changelogs: &[&str]) -> SharedConnection {
    create_dir_all(db_dir).expect("to be able to create dir");

    let conn = Connection::open(db_dir.join(format!("{name}.db")))
        .expect("expected db connection to be able to open");

    migrate(&conn, name, changelogs);

    Arc::new(Mutex::new(conn))
}

/// Applies every changelog the database has not seen yet.
///
/// The number of applied changelogs is kept in `PRAGMA user_version`.
pub fn migrate(conn: &Connection, name: &str, changelogs: &[&str]) {
    let version: u32 = conn
        .query_row("PRAGMA user_version", (), |row| row.get(0))
        .expect("Version to be available");

    for (index, changelog) in changelogs.iter().enumerate().skip(version as usize) {
        conn.execute_batch(changelog)
            .expect("Initialization to succeed");

        conn.execute(&format!("PRAGMA user_version = {}", index + 1), ())
            .expect("Setting pragma to succeed");

        info!("Migrated {name} db to version {}", index + 1);
    }
}

#[cfg(test)]
pub fn open_in_memory(name: &str, changelogs: &[&str]) -> SharedConnection {
    let conn = Connection::open_in_memory().expect("in memory db to open");
    migrate(&conn, name, changelogs);

    Arc::new(Mutex::new(conn))
}
