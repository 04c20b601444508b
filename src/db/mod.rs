mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;

/// Open the backing SQLite file and bring its schema up to date.
///
/// The document store and the identity service each hold their own
/// connection to the same file.
pub(crate) fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;")
        .context("Failed to set database pragmas")?;
    migrate(&conn).context("Database migration failed")?;
    Ok(conn)
}

#[cfg(test)]
pub(crate) fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    migrate(&conn)?;
    Ok(conn)
}

fn migrate(conn: &Connection) -> Result<()> {
    let has_version_table: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !has_version_table {
        conn.execute_batch(schema::SCHEMA_V1)?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![schema::CURRENT_VERSION],
        )?;
        log::info!(
            "event=db_migrate status=fresh version={}",
            schema::CURRENT_VERSION
        );
        return Ok(());
    }

    let current: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    for &(from_version, sql) in schema::MIGRATIONS {
        if current <= from_version {
            conn.execute_batch(sql)?;
        }
    }

    if current < schema::CURRENT_VERSION {
        conn.execute(
            "UPDATE schema_version SET version = ?1",
            params![schema::CURRENT_VERSION],
        )?;
        log::info!(
            "event=db_migrate status=upgraded from={current} to={}",
            schema::CURRENT_VERSION
        );
    }

    Ok(())
}
