//! Time blocks and categories.
//!
//! Instants are wall-clock (`NaiveDateTime`): the dial shows the local day,
//! so a block keeps its position on the ring regardless of time zone.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::geometry::{self, SECONDS_PER_DAY};

/// Stable block identifier.
pub type BlockId = String;

/// Where a block came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSource {
    #[default]
    Manual,
    Calendar,
    Routine,
    Task,
    Imported,
}

impl BlockSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Calendar => "calendar",
            Self::Routine => "routine",
            Self::Task => "task",
            Self::Imported => "imported",
        }
    }

    /// Parse a stored tag; unknown tags fall back to `Manual`.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "calendar" => Self::Calendar,
            "routine" => Self::Routine,
            "task" => Self::Task,
            "imported" => Self::Imported,
            _ => Self::Manual,
        }
    }
}

/// A scheduled interval on the dial.
///
/// `end_time` may fall on the next calendar day; the block then crosses
/// midnight and its end angle is numerically smaller than its start angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub id: BlockId,
    pub title: String,
    #[serde(default)]
    pub emoji: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub actual_start: Option<NaiveDateTime>,
    #[serde(default)]
    pub actual_end: Option<NaiveDateTime>,
    #[serde(default)]
    pub source: BlockSource,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TimeBlock {
    /// Create a manual block with a fresh id.
    pub fn new(title: impl Into<String>, start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            emoji: None,
            start_time,
            end_time,
            category_id: None,
            task_id: None,
            done: false,
            actual_start: None,
            actual_end: None,
            source: BlockSource::Manual,
            notes: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn with_source(mut self, source: BlockSource) -> Self {
        self.source = source;
        self
    }

    /// Wrap-aware duration in `[0, 24h]`.
    ///
    /// A block whose stored end precedes its start is read on the 24h ring,
    /// so `22:00 -> 02:00` on the same date is four hours.
    pub fn duration(&self) -> Duration {
        let secs = (self.end_time - self.start_time).num_seconds();
        if secs > 0 && secs <= SECONDS_PER_DAY {
            return Duration::seconds(secs);
        }
        let wrapped = secs.rem_euclid(SECONDS_PER_DAY);
        if wrapped == 0 && secs != 0 {
            Duration::seconds(SECONDS_PER_DAY)
        } else {
            Duration::seconds(wrapped)
        }
    }

    /// End instant derived from start + wrap-aware duration.
    pub fn effective_end(&self) -> NaiveDateTime {
        self.start_time + self.duration()
    }

    pub fn start_angle(&self) -> f64 {
        geometry::angle_from_instant(self.start_time)
    }

    pub fn end_angle(&self) -> f64 {
        geometry::angle_from_instant(self.end_time)
    }

    /// Angular width of the block; a full-day block sweeps 360°.
    pub fn sweep_angle(&self) -> f64 {
        let secs = self.duration().num_seconds();
        if secs >= SECONDS_PER_DAY {
            return 360.0;
        }
        secs as f64 * 360.0 / SECONDS_PER_DAY as f64
    }

    pub fn crosses_midnight(&self) -> bool {
        self.effective_end().date() > self.start_time.date()
            && self.effective_end().time() != chrono::NaiveTime::MIN
    }

    /// Half-open overlap: touching edges do not overlap.
    pub fn overlaps(&self, other: &TimeBlock) -> bool {
        self.start_time < other.effective_end() && self.effective_end() > other.start_time
    }
}

/// Labeled color/emoji tag. Owned by the store; read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub emoji: Option<String>,
}
