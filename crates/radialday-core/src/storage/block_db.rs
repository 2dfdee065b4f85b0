//! SQLite-based storage for blocks and categories.

use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, migrations, BlockStore};
use crate::block::{BlockSource, Category, TimeBlock};
use crate::error::StoreError;

/// Wall-clock instants are stored as sortable text.
const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const BLOCK_COLUMNS: &str = "id, title, emoji, start_time, end_time, category_id, task_id, \
                             done, source, actual_start, actual_end, notes";

// === Helper Functions ===

fn format_instant(instant: NaiveDateTime) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

fn parse_instant(idx: usize, raw: &str) -> Result<NaiveDateTime, rusqlite::Error> {
    NaiveDateTime::parse_from_str(raw, INSTANT_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_optional_instant(
    idx: usize,
    raw: Option<String>,
) -> Result<Option<NaiveDateTime>, rusqlite::Error> {
    raw.map(|s| parse_instant(idx, &s)).transpose()
}

/// Build a TimeBlock from a row selected with `BLOCK_COLUMNS`
fn row_to_block(row: &rusqlite::Row) -> Result<TimeBlock, rusqlite::Error> {
    let start_str: String = row.get(3)?;
    let end_str: String = row.get(4)?;
    let source_str: String = row.get(8)?;

    Ok(TimeBlock {
        id: row.get(0)?,
        title: row.get(1)?,
        emoji: row.get(2)?,
        start_time: parse_instant(3, &start_str)?,
        end_time: parse_instant(4, &end_str)?,
        category_id: row.get(5)?,
        task_id: row.get(6)?,
        done: row.get(7)?,
        source: BlockSource::parse(&source_str),
        actual_start: parse_optional_instant(9, row.get(9)?)?,
        actual_end: parse_optional_instant(10, row.get(10)?)?,
        notes: row.get(11)?,
    })
}

pub struct BlockDb {
    conn: Connection,
}

impl BlockDb {
    /// Open the block database at `<data_dir>/radialday.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Self::open_at(dir.join("radialday.db"))
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        migrations::migrate(&conn).map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // === Block queries ===

    pub fn get_block(&self, id: &str) -> Result<Option<TimeBlock>, StoreError> {
        let sql = format!("SELECT {BLOCK_COLUMNS} FROM blocks WHERE id = ?1");
        let block = self
            .conn
            .query_row(&sql, params![id], row_to_block)
            .optional()?;
        Ok(block)
    }

    /// Every stored block, ordered by start.
    pub fn list_blocks(&self) -> Result<Vec<TimeBlock>, StoreError> {
        let sql = format!("SELECT {BLOCK_COLUMNS} FROM blocks ORDER BY start_time, id");
        let mut stmt = self.conn.prepare(&sql)?;
        let blocks = stmt
            .query_map([], row_to_block)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(blocks)
    }

    // === Category CRUD ===

    pub fn upsert_category(&self, category: &Category) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO categories (id, name, color, emoji) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET name = ?2, color = ?3, emoji = ?4",
            params![category.id, category.name, category.color, category.emoji],
        )?;
        Ok(())
    }

    pub fn delete_category(&self, id: &str) -> Result<bool, StoreError> {
        let rows = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

impl BlockStore for BlockDb {
    fn fetch_blocks(&self, date: NaiveDate) -> Result<Vec<TimeBlock>, StoreError> {
        let day_start = date.and_time(chrono::NaiveTime::MIN);
        let day_end = day_start + Duration::days(1);
        let sql = format!(
            "SELECT {BLOCK_COLUMNS} FROM blocks
             WHERE start_time >= ?1 AND start_time < ?2
             ORDER BY start_time, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let blocks = stmt
            .query_map(
                params![format_instant(day_start), format_instant(day_end)],
                row_to_block,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(blocks)
    }

    fn create_block(&mut self, block: &TimeBlock) -> Result<TimeBlock, StoreError> {
        self.conn.execute(
            "INSERT INTO blocks (id, title, emoji, start_time, end_time, category_id, task_id,
                                 done, source, actual_start, actual_end, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                block.id,
                block.title,
                block.emoji,
                format_instant(block.start_time),
                format_instant(block.end_time),
                block.category_id,
                block.task_id,
                block.done,
                block.source.as_str(),
                block.actual_start.map(format_instant),
                block.actual_end.map(format_instant),
                block.notes,
            ],
        )?;
        Ok(block.clone())
    }

    fn update_block(&mut self, block: &TimeBlock) -> Result<TimeBlock, StoreError> {
        let rows = self.conn.execute(
            "UPDATE blocks
             SET title = ?1, emoji = ?2, start_time = ?3, end_time = ?4, category_id = ?5,
                 task_id = ?6, done = ?7, source = ?8, actual_start = ?9, actual_end = ?10,
                 notes = ?11
             WHERE id = ?12",
            params![
                block.title,
                block.emoji,
                format_instant(block.start_time),
                format_instant(block.end_time),
                block.category_id,
                block.task_id,
                block.done,
                block.source.as_str(),
                block.actual_start.map(format_instant),
                block.actual_end.map(format_instant),
                block.notes,
                block.id,
            ],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(block.id.clone()));
        }
        Ok(block.clone())
    }

    fn delete_block(&mut self, id: &str) -> Result<bool, StoreError> {
        let rows = self
            .conn
            .execute("DELETE FROM blocks WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color, emoji FROM categories ORDER BY name, id")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    color: row.get(2)?,
                    emoji: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }
}
