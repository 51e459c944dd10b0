use std::path::Path;

use log::info;
use rusqlite::Connection;

static SCHEMA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/db/schema.sql"));

pub fn open_db(path: &Path) -> rusqlite::Result<Connection> {
    if !path.exists() { info!("Creating new database {}", path.display()) }
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

/// In memory database, for dry runs without a local directory and for tests
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

/// Everything recorded after this point is dropped by a dry run
pub fn begin(conn: &Connection) -> rusqlite::Result<()> {
    info!("Creating dry run save point");
    conn.execute_batch("SAVEPOINT dry_run")
}

pub fn release_or_rollback(conn: &Connection, dry_run: bool) -> rusqlite::Result<()> {
    match dry_run {
        true => {
            info!("--dry-run set, rolling back database state");
            conn.execute_batch("ROLLBACK TO dry_run; RELEASE dry_run")
        }
        false => {
            info!("--dry-run not set, releasing dry run save point");
            conn.execute_batch("RELEASE dry_run")
        }
    }
}
