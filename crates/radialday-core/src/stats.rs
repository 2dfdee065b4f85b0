//! Per-day statistics over scheduled blocks.
//!
//! Durations add up block by block, so overlapping blocks count twice. The
//! numbers describe what was planned, not wall-clock coverage.

use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::block::TimeBlock;

/// Time scheduled under one category (`None` for uncategorized blocks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category_id: Option<String>,
    pub seconds: i64,
    pub block_count: usize,
}

impl CategoryShare {
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.seconds)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatistics {
    pub total_seconds: i64,
    /// Sorted by duration descending, then category id.
    pub by_category: Vec<CategoryShare>,
    pub completed: usize,
    pub block_count: usize,
}

impl DayStatistics {
    pub fn total(&self) -> Duration {
        Duration::seconds(self.total_seconds)
    }

    /// Completed blocks as a fraction of all blocks, 0.0 for an empty day.
    pub fn completion_ratio(&self) -> f64 {
        if self.block_count == 0 {
            return 0.0;
        }
        self.completed as f64 / self.block_count as f64
    }
}

pub fn compute_statistics(blocks: &[TimeBlock]) -> DayStatistics {
    let mut per_category: HashMap<Option<&str>, (i64, usize)> = HashMap::new();
    let mut total_seconds = 0;
    let mut completed = 0;

    for block in blocks {
        let secs = block.duration().num_seconds();
        total_seconds += secs;
        if block.done {
            completed += 1;
        }
        let entry = per_category
            .entry(block.category_id.as_deref())
            .or_insert((0, 0));
        entry.0 += secs;
        entry.1 += 1;
    }

    let mut by_category: Vec<CategoryShare> = per_category
        .into_iter()
        .map(|(id, (seconds, block_count))| CategoryShare {
            category_id: id.map(str::to_string),
            seconds,
            block_count,
        })
        .collect();
    by_category.sort_by(|a, b| {
        b.seconds
            .cmp(&a.seconds)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });

    DayStatistics {
        total_seconds,
        by_category,
        completed,
        block_count: blocks.len(),
    }
}
