//! Block persistence and on-disk configuration.
//!
//! The engine only sees the [`BlockStore`] contract. Two stores ship with
//! the crate: [`MemoryBlockStore`] for tests and embedding, and [`BlockDb`]
//! backed by SQLite.

mod block_db;
mod config;
mod memory;
pub mod migrations;

pub use block_db::BlockDb;
pub use config::EngineConfig;
pub use memory::MemoryBlockStore;

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::block::{Category, TimeBlock};
use crate::error::StoreError;

/// Data-access contract between the engine and its persistence layer.
///
/// Calls are synchronous and may fail. The engine never retries: a failed
/// write drops the in-flight change and keeps the last committed state.
pub trait BlockStore {
    /// Blocks starting on `date`.
    fn fetch_blocks(&self, date: NaiveDate) -> Result<Vec<TimeBlock>, StoreError>;

    /// Persist a new block and return it as stored.
    fn create_block(&mut self, block: &TimeBlock) -> Result<TimeBlock, StoreError>;

    /// Replace an existing block and return it as stored.
    fn update_block(&mut self, block: &TimeBlock) -> Result<TimeBlock, StoreError>;

    /// Remove a block. `Ok(false)` when no block had that id.
    fn delete_block(&mut self, id: &str) -> Result<bool, StoreError>;

    fn fetch_categories(&self) -> Result<Vec<Category>, StoreError>;
}

/// Returns the radialday data directory, creating it when missing.
///
/// `RADIALDAY_DATA_DIR` overrides the location outright. Otherwise the
/// directory is `~/.config/radialday`, or `~/.config/radialday-dev` when
/// `RADIALDAY_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("RADIALDAY_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("RADIALDAY_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("radialday-dev")
            } else {
                base_dir.join("radialday")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
