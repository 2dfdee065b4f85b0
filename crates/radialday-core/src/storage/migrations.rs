//! Database schema migrations for the block store.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Current schema version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!("failed to read schema_version: {}", e);
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// v1: blocks and categories.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS blocks (
            id           TEXT PRIMARY KEY,
            title        TEXT NOT NULL,
            emoji        TEXT,
            start_time   TEXT NOT NULL,
            end_time     TEXT NOT NULL,
            category_id  TEXT,
            task_id      TEXT,
            done         INTEGER NOT NULL DEFAULT 0,
            source       TEXT NOT NULL DEFAULT 'manual'
        );

        CREATE TABLE IF NOT EXISTS categories (
            id     TEXT PRIMARY KEY,
            name   TEXT NOT NULL,
            color  TEXT NOT NULL,
            emoji  TEXT
        );",
    )?;
    set_schema_version(conn, 1)
}

/// v2: actual start/end tracking, notes, and the day lookup index.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "ALTER TABLE blocks ADD COLUMN actual_start TEXT;
         ALTER TABLE blocks ADD COLUMN actual_end TEXT;
         ALTER TABLE blocks ADD COLUMN notes TEXT;
         CREATE INDEX IF NOT EXISTS idx_blocks_start_time ON blocks(start_time);",
    )?;
    set_schema_version(conn, 2)
}
