//! In-process block store.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::BlockStore;
use crate::block::{BlockId, Category, TimeBlock};
use crate::error::StoreError;

/// Blocks kept in a map keyed by id.
///
/// Writes can be made to fail on demand, which is how the engine's
/// rejected-commit path gets exercised.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockStore {
    blocks: BTreeMap<BlockId, TimeBlock>,
    categories: Vec<Category>,
    fail_writes: bool,
    fail_reads: bool,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(blocks: impl IntoIterator<Item = TimeBlock>) -> Self {
        Self {
            blocks: blocks.into_iter().map(|b| (b.id.clone(), b)).collect(),
            ..Self::default()
        }
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Make every create/update/delete fail with [`StoreError::Rejected`].
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make every fetch fail with [`StoreError::QueryFailed`].
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn get(&self, id: &str) -> Option<&TimeBlock> {
        self.blocks.get(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Rejected("writes disabled".into()));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads {
            return Err(StoreError::QueryFailed("reads disabled".into()));
        }
        Ok(())
    }
}

impl BlockStore for MemoryBlockStore {
    fn fetch_blocks(&self, date: NaiveDate) -> Result<Vec<TimeBlock>, StoreError> {
        self.check_read()?;
        let mut blocks: Vec<TimeBlock> = self
            .blocks
            .values()
            .filter(|b| b.start_time.date() == date)
            .cloned()
            .collect();
        blocks.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        Ok(blocks)
    }

    fn create_block(&mut self, block: &TimeBlock) -> Result<TimeBlock, StoreError> {
        self.check_write()?;
        if self.blocks.contains_key(&block.id) {
            return Err(StoreError::Rejected(format!("duplicate block id {}", block.id)));
        }
        self.blocks.insert(block.id.clone(), block.clone());
        Ok(block.clone())
    }

    fn update_block(&mut self, block: &TimeBlock) -> Result<TimeBlock, StoreError> {
        self.check_write()?;
        match self.blocks.get_mut(&block.id) {
            Some(existing) => {
                *existing = block.clone();
                Ok(block.clone())
            }
            None => Err(StoreError::NotFound(block.id.clone())),
        }
    }

    fn delete_block(&mut self, id: &str) -> Result<bool, StoreError> {
        self.check_write()?;
        Ok(self.blocks.remove(id).is_some())
    }

    fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.check_read()?;
        Ok(self.categories.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn at(d: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        d.and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn fetch_filters_by_start_day_and_sorts() {
        let next = day().succ_opt().unwrap();
        let store = MemoryBlockStore::with_blocks([
            TimeBlock::new("Late", at(day(), 20, 0), at(day(), 21, 0)).with_id("late"),
            TimeBlock::new("Early", at(day(), 6, 0), at(day(), 7, 0)).with_id("early"),
            TimeBlock::new("Other", at(next, 6, 0), at(next, 7, 0)).with_id("other"),
        ]);
        let ids: Vec<String> = store
            .fetch_blocks(day())
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn failing_writes_leave_state_untouched() {
        let block = TimeBlock::new("Gym", at(day(), 7, 0), at(day(), 8, 0)).with_id("gym");
        let mut store = MemoryBlockStore::with_blocks([block.clone()]);
        store.set_fail_writes(true);

        let mut moved = block.clone();
        moved.start_time = at(day(), 9, 0);
        moved.end_time = at(day(), 10, 0);
        assert!(matches!(
            store.update_block(&moved),
            Err(StoreError::Rejected(_))
        ));
        assert!(store.delete_block("gym").is_err());
        assert_eq!(store.get("gym"), Some(&block));
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let mut store = MemoryBlockStore::new();
        let block = TimeBlock::new("Ghost", at(day(), 7, 0), at(day(), 8, 0));
        assert!(matches!(
            store.update_block(&block),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let block = TimeBlock::new("Gym", at(day(), 7, 0), at(day(), 8, 0));
        let mut store = MemoryBlockStore::new();
        store.create_block(&block).unwrap();
        assert!(store.create_block(&block).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failing_reads() {
        let mut store = MemoryBlockStore::new();
        store.set_fail_reads(true);
        assert!(store.fetch_blocks(day()).is_err());
        assert!(store.fetch_categories().is_err());
    }
}
