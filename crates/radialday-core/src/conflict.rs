//! Time overlap detection between blocks of one day.
//!
//! Intervals are half-open: a block ending at 10:00 and another starting at
//! 10:00 share an edge but do not conflict. A day rarely holds more than a
//! few dozen blocks, so the pairwise scan is quadratic without an index.

use std::collections::BTreeSet;

use crate::block::{BlockId, TimeBlock};

/// Two blocks whose intervals overlap, ids ordered lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConflictPair {
    pub first: BlockId,
    pub second: BlockId,
}

impl ConflictPair {
    fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

/// Every overlapping pair among `blocks`, sorted.
pub fn conflict_pairs(blocks: &[TimeBlock]) -> Vec<ConflictPair> {
    let mut pairs = Vec::new();
    for (i, a) in blocks.iter().enumerate() {
        for b in &blocks[i + 1..] {
            if a.overlaps(b) {
                pairs.push(ConflictPair::new(&a.id, &b.id));
            }
        }
    }
    pairs.sort();
    pairs
}

/// Ids of every block that overlaps at least one other block.
pub fn detect_conflicts(blocks: &[TimeBlock]) -> BTreeSet<BlockId> {
    let mut ids = BTreeSet::new();
    for (i, a) in blocks.iter().enumerate() {
        for b in &blocks[i + 1..] {
            if a.overlaps(b) {
                ids.insert(a.id.clone());
                ids.insert(b.id.clone());
            }
        }
    }
    ids
}

/// Blocks overlapping `target` (itself excluded), earliest start first.
///
/// Equal starts are ordered by id so cycling through them is stable.
pub fn overlapping_blocks<'a>(target: &TimeBlock, blocks: &'a [TimeBlock]) -> Vec<&'a TimeBlock> {
    let mut hits: Vec<&TimeBlock> = blocks
        .iter()
        .filter(|b| b.id != target.id && b.overlaps(target))
        .collect();
    hits.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
    hits
}
