//! A single in-flight drag or resize.
//!
//! The session owns the preview copy of the block. It is created when the
//! gesture starts and consumed exactly once by [`GestureSession::finish`] or
//! [`GestureSession::cancel`]; nothing else ever holds the preview.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::block::{BlockId, TimeBlock};
use crate::geometry::{self, angular_distance, normalize_angle};
use crate::snap::{self, Edge, SnapInterval};

/// What the gesture does to its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Shift the whole block, keeping its duration.
    Move,
    /// Drag one edge, keeping the other.
    Resize(Edge),
}

/// Emitted whenever the snapped position lands on a new grid slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapTick {
    pub block_id: BlockId,
    pub angle: f64,
    pub at: NaiveDateTime,
}

/// How a finished gesture resolves.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// The preview differs from the original and should be persisted.
    Commit(TimeBlock),
    /// No movement, or the block ended where it started.
    Discard,
}

#[derive(Debug, Clone)]
pub struct GestureSession {
    kind: GestureKind,
    day: NaiveDate,
    snap: SnapInterval,
    original: TimeBlock,
    preview: TimeBlock,
    /// Touch angle minus block start angle at gesture start.
    angle_offset: f64,
    last_snapped_angle: f64,
    moved: bool,
}

impl GestureSession {
    /// Start moving `block`, remembering where on the block the finger landed.
    pub fn begin_move(
        block: &TimeBlock,
        touch_angle: f64,
        day: NaiveDate,
        snap: SnapInterval,
    ) -> Self {
        let start_angle = block.start_angle();
        Self {
            kind: GestureKind::Move,
            day,
            snap,
            original: block.clone(),
            preview: unwrapped(block),
            angle_offset: normalize_angle(touch_angle) - start_angle,
            last_snapped_angle: start_angle,
            moved: false,
        }
    }

    pub fn begin_resize(block: &TimeBlock, edge: Edge, day: NaiveDate, snap: SnapInterval) -> Self {
        let edge_angle = match edge {
            Edge::Start => block.start_angle(),
            Edge::End => block.end_angle(),
        };
        Self {
            kind: GestureKind::Resize(edge),
            day,
            snap,
            original: block.clone(),
            preview: unwrapped(block),
            angle_offset: 0.0,
            last_snapped_angle: edge_angle,
            moved: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    pub fn block_id(&self) -> &str {
        &self.original.id
    }

    pub fn original(&self) -> &TimeBlock {
        &self.original
    }

    pub fn preview(&self) -> &TimeBlock {
        &self.preview
    }

    pub fn has_moved(&self) -> bool {
        self.moved
    }

    pub fn snap_interval(&self) -> SnapInterval {
        self.snap
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Feed one touch sample. Returns a tick when the snapped slot changed.
    pub fn update(&mut self, touch_angle: f64) -> Option<SnapTick> {
        self.moved = true;
        let edge_instant = match self.kind {
            GestureKind::Move => self.apply_move(touch_angle),
            GestureKind::Resize(edge) => self.apply_resize(edge, touch_angle),
        };
        let angle = geometry::angle_from_instant(edge_instant);
        if angle == self.last_snapped_angle {
            return None;
        }
        self.last_snapped_angle = angle;
        Some(SnapTick {
            block_id: self.original.id.clone(),
            angle,
            at: edge_instant,
        })
    }

    /// End the gesture. Consumes the session.
    pub fn finish(self) -> GestureOutcome {
        if !self.moved {
            return GestureOutcome::Discard;
        }
        if self.preview.start_time == self.original.start_time
            && self.preview.end_time == self.original.effective_end()
        {
            return GestureOutcome::Discard;
        }
        GestureOutcome::Commit(self.preview)
    }

    /// Abandon the gesture and drop the preview.
    pub fn cancel(self) {
        tracing::debug!("gesture on {} cancelled", self.original.id);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply_move(&mut self, touch_angle: f64) -> NaiveDateTime {
        let start_angle = normalize_angle(touch_angle - self.angle_offset);
        let start = self
            .snap
            .snap(geometry::instant_from_angle(start_angle, self.day));
        self.preview.start_time = start;
        self.preview.end_time = start + self.original.duration();
        start
    }

    fn apply_resize(&mut self, edge: Edge, touch_angle: f64) -> NaiveDateTime {
        let touched = self
            .snap
            .snap(geometry::instant_from_angle(touch_angle, self.day))
            .time();
        let (start, end) = match edge {
            Edge::Start => {
                let candidate = nearest_occurrence(touched, self.preview.start_time);
                snap::clamp_duration(candidate, self.preview.end_time, self.snap, Edge::Start)
            }
            Edge::End => {
                let candidate = nearest_occurrence(touched, self.preview.end_time);
                snap::clamp_duration(self.preview.start_time, candidate, self.snap, Edge::End)
            }
        };
        self.preview.start_time = start;
        self.preview.end_time = end;
        match edge {
            Edge::Start => start,
            Edge::End => end,
        }
    }
}

/// Copy of `block` whose end lies after its start, so edge math never
/// sees a stored end-before-start pair.
fn unwrapped(block: &TimeBlock) -> TimeBlock {
    TimeBlock {
        end_time: block.effective_end(),
        ..block.clone()
    }
}

/// The occurrence of `time` on the day before, of, or after `reference`
/// that lies closest to it.
///
/// Dragging an end edge past midnight lands on the next day; dragging a
/// start edge back past midnight lands on the previous one.
pub fn nearest_occurrence(time: NaiveTime, reference: NaiveDateTime) -> NaiveDateTime {
    let same_day = reference.date().and_time(time);
    [same_day - Duration::days(1), same_day, same_day + Duration::days(1)]
        .into_iter()
        .min_by_key(|candidate| (*candidate - reference).num_seconds().abs())
        .unwrap_or(same_day)
}

/// Which edge a resize grabs, by bisecting the block's sweep.
///
/// Touches on the first half take the start edge, the second half the end
/// edge. A touch past either end of the arc (possible through the hit
/// tolerance) takes whichever edge is angularly nearer.
pub fn classify_resize_edge(block: &TimeBlock, touch_angle: f64) -> Edge {
    let sweep = block.sweep_angle();
    let offset = normalize_angle(touch_angle - block.start_angle());
    if offset <= sweep {
        return if offset <= sweep / 2.0 {
            Edge::Start
        } else {
            Edge::End
        };
    }
    if angular_distance(touch_angle, block.end_angle())
        <= angular_distance(touch_angle, block.start_angle())
    {
        Edge::End
    } else {
        Edge::Start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::angle_from_instant;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn angle(h: u32, m: u32) -> f64 {
        angle_from_instant(at(h, m))
    }

    fn nine_to_ten() -> TimeBlock {
        TimeBlock::new("Focus", at(9, 0), at(10, 0)).with_id("a")
    }

    #[test]
    fn move_snaps_and_keeps_duration() {
        let block = nine_to_ten();
        let mut session = GestureSession::begin_move(&block, angle(9, 0), day(), SnapInterval::Fifteen);
        let tick = session.update(angle(14, 7));
        assert_eq!(session.preview().start_time, at(14, 0));
        assert_eq!(session.preview().end_time, at(15, 0));
        assert_eq!(tick.map(|t| t.at), Some(at(14, 0)));
        assert_eq!(
            session.finish(),
            GestureOutcome::Commit(TimeBlock {
                start_time: at(14, 0),
                end_time: at(15, 0),
                ..block
            })
        );
    }

    #[test]
    fn move_keeps_finger_offset() {
        let block = nine_to_ten();
        // grabbed at 09:30, the middle of the block
        let mut session = GestureSession::begin_move(&block, angle(9, 30), day(), SnapInterval::Fifteen);
        session.update(angle(12, 30));
        assert_eq!(session.preview().start_time, at(12, 0));
        assert_eq!(session.preview().end_time, at(13, 0));
    }

    #[test]
    fn snap_ticks_once_per_slot() {
        let block = nine_to_ten();
        let mut session = GestureSession::begin_move(&block, angle(9, 0), day(), SnapInterval::Fifteen);
        assert!(session.update(angle(9, 5)).is_none(), "still on 09:00");
        assert!(session.update(angle(9, 16)).is_some());
        assert!(session.update(angle(9, 20)).is_none());
        assert!(session.update(angle(9, 29)).is_none());
        assert!(session.update(angle(9, 31)).is_some());
    }

    #[test]
    fn untouched_gesture_discards() {
        let session = GestureSession::begin_move(&nine_to_ten(), angle(9, 0), day(), SnapInterval::Fifteen);
        assert_eq!(session.finish(), GestureOutcome::Discard);
    }

    #[test]
    fn returning_to_origin_discards() {
        let mut session = GestureSession::begin_move(&nine_to_ten(), angle(9, 0), day(), SnapInterval::Fifteen);
        session.update(angle(11, 0));
        session.update(angle(9, 10));
        assert!(session.has_moved());
        assert_eq!(session.finish(), GestureOutcome::Discard);
    }

    #[test]
    fn resize_end_below_minimum_clamps_forward_from_start() {
        let block = nine_to_ten();
        let mut session = GestureSession::begin_resize(&block, Edge::End, day(), SnapInterval::Fifteen);
        session.update(angle(9, 5));
        assert_eq!(session.preview().start_time, at(9, 0));
        assert_eq!(session.preview().end_time, at(9, 15));
    }

    #[test]
    fn resize_start_below_minimum_clamps_back_from_end() {
        let block = nine_to_ten();
        let mut session = GestureSession::begin_resize(&block, Edge::Start, day(), SnapInterval::Ten);
        session.update(angle(10, 40));
        assert_eq!(session.preview().start_time, at(9, 50));
        assert_eq!(session.preview().end_time, at(10, 0));
    }

    #[test]
    fn resize_end_across_midnight_picks_next_day() {
        let block = TimeBlock::new("Late", at(22, 0), at(23, 30)).with_id("late");
        let mut session = GestureSession::begin_resize(&block, Edge::End, day(), SnapInterval::Fifteen);
        session.update(angle(0, 50));
        let next = day().succ_opt().unwrap().and_hms_opt(0, 45, 0).unwrap();
        assert_eq!(session.preview().end_time, next);
        assert_eq!(session.preview().duration(), Duration::minutes(165));
    }

    #[test]
    fn resize_start_back_across_midnight_picks_previous_day() {
        let block = TimeBlock::new("Early", at(0, 30), at(2, 0)).with_id("early");
        let mut session = GestureSession::begin_resize(&block, Edge::Start, day(), SnapInterval::Thirty);
        session.update(angle(23, 40));
        let prev = day().pred_opt().unwrap().and_hms_opt(23, 30, 0).unwrap();
        assert_eq!(session.preview().start_time, prev);
        assert_eq!(session.preview().end_time, at(2, 0));
    }

    #[test]
    fn resize_end_of_block_stored_across_midnight() {
        // stored as 22:00 -> 02:00 on the same date, four hours long
        let block = TimeBlock::new("Night", at(22, 0), at(2, 0)).with_id("night");
        let mut session = GestureSession::begin_resize(&block, Edge::End, day(), SnapInterval::Fifteen);
        session.update(angle(2, 30));
        let next = day().succ_opt().unwrap().and_hms_opt(2, 30, 0).unwrap();
        assert_eq!(session.preview().start_time, at(22, 0));
        assert_eq!(session.preview().end_time, next);
        assert_eq!(session.preview().duration(), Duration::minutes(270));
    }

    #[test]
    fn returning_block_stored_across_midnight_to_origin_discards() {
        let block = TimeBlock::new("Night", at(22, 0), at(2, 0)).with_id("night");
        let mut session = GestureSession::begin_move(&block, angle(22, 0), day(), SnapInterval::Fifteen);
        session.update(angle(20, 0));
        session.update(angle(22, 5));
        assert_eq!(session.finish(), GestureOutcome::Discard);
    }

    #[test]
    fn resize_never_exceeds_a_day() {
        let block = TimeBlock::new("Long", at(6, 0), at(6, 0) + Duration::hours(23)).with_id("long");
        let mut session = GestureSession::begin_resize(&block, Edge::End, day(), SnapInterval::Five);
        // end sits at 05:00 next day; drag it to 07:00 next day
        session.update(angle(5, 30));
        session.update(angle(6, 30));
        session.update(angle(7, 0));
        assert_eq!(session.preview().duration(), Duration::hours(24));
    }

    #[test]
    fn bisection_picks_edges() {
        let block = nine_to_ten();
        assert_eq!(classify_resize_edge(&block, angle(9, 10)), Edge::Start);
        assert_eq!(classify_resize_edge(&block, angle(9, 30)), Edge::Start);
        assert_eq!(classify_resize_edge(&block, angle(9, 31)), Edge::End);
        // outside the arc through tolerance
        assert_eq!(classify_resize_edge(&block, angle(10, 5)), Edge::End);
        assert_eq!(classify_resize_edge(&block, angle(8, 55)), Edge::Start);
    }

    #[test]
    fn bisection_is_wrap_aware() {
        // 22:00 -> 02:00, midpoint at 00:00 rather than the naive 12:00
        let block = TimeBlock::new(
            "Night",
            at(22, 0),
            day().succ_opt().unwrap().and_hms_opt(2, 0, 0).unwrap(),
        );
        assert_eq!(classify_resize_edge(&block, angle(23, 0)), Edge::Start);
        assert_eq!(classify_resize_edge(&block, angle(1, 0)), Edge::End);
    }

    #[test]
    fn nearest_occurrence_chooses_closest_day() {
        let reference = at(23, 0);
        let t = NaiveTime::from_hms_opt(1, 0, 0).unwrap();
        assert_eq!(
            nearest_occurrence(t, reference),
            day().succ_opt().unwrap().and_time(t)
        );
        assert_eq!(nearest_occurrence(t, at(3, 0)), at(1, 0));
    }
}
