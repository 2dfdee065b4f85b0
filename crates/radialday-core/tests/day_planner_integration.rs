//! End-to-end tests for the day planner.
//!
//! Each test drives the public facade the way a dial UI would: touches are
//! given as screen points on the default dial, and results are checked
//! against the store behind the planner.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use radialday_core::{
    BlockDb, BlockStore, DayPlanner, EngineConfig, EngineEvent, Feedback, InteractionMode,
    MemoryBlockStore, Point, RadialFocusState, SnapInterval, TimeBlock,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    day().and_hms_opt(h, m, 0).unwrap()
}

fn block(id: &str, start: NaiveDateTime, end: NaiveDateTime) -> TimeBlock {
    TimeBlock::new(id.to_uppercase(), start, end).with_id(id)
}

/// Point in the middle of the ring band at wall-clock `h:m`.
fn touch(h: u32, m: u32) -> Point {
    EngineConfig::default()
        .dial
        .point_at(f64::from(h) * 15.0 + f64::from(m) * 0.25)
}

fn planner(blocks: Vec<TimeBlock>) -> DayPlanner<MemoryBlockStore> {
    DayPlanner::new(
        MemoryBlockStore::with_blocks(blocks),
        EngineConfig::default(),
        day(),
    )
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_overlapping_blocks_are_flagged() {
    let planner = planner(vec![
        block("a", at(9, 0), at(10, 0)),
        block("b", at(9, 30), at(10, 30)),
    ]);
    let ids: Vec<&str> = planner.conflicts().iter().map(String::as_str).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn test_touching_blocks_do_not_conflict() {
    let planner = planner(vec![
        block("a", at(9, 0), at(10, 0)),
        block("b", at(10, 0), at(11, 0)),
    ]);
    assert!(planner.conflicts().is_empty());
}

#[test]
fn test_long_press_drag_moves_block_on_grid() {
    let mut planner = planner(vec![block("a", at(9, 0), at(10, 0))]);
    let grab = touch(9, 10);

    planner.tap(grab);
    planner.long_press(grab, Duration::from_millis(650));
    assert_eq!(
        planner.mode(),
        &InteractionMode::LongPressing {
            block_id: "a".into()
        }
    );
    assert!(planner.begin_drag(grab));
    planner.drag(touch(12, 0));
    // the finger stays 10 minutes ahead of the block start: 14:07
    planner.drag(touch(14, 17));
    let committed = planner.end_drag().unwrap();

    assert_eq!((committed.start_time, committed.end_time), (at(14, 0), at(15, 0)));
    let stored = planner.store().get("a").unwrap();
    assert_eq!(stored.start_time, at(14, 0));
}

#[test]
fn test_resize_below_minimum_clamps_to_snap() {
    let mut planner = planner(vec![block("a", at(9, 0), at(10, 0))]);
    assert!(planner.begin_drag(touch(9, 55)));
    planner.drag(touch(9, 5));
    let committed = planner.end_drag().unwrap();
    assert_eq!(committed.end_time, at(9, 15));
}

#[test]
fn test_double_tap_cycles_overlapping_blocks() {
    let mut planner = planner(vec![
        block("a", at(9, 0), at(12, 0)),
        block("b", at(9, 30), at(10, 0)),
        block("c", at(10, 30), at(11, 0)),
    ]);
    let on_a = touch(11, 45);
    let mut seen = Vec::new();
    for _ in 0..3 {
        planner.double_tap(on_a);
        seen.push(planner.focus().focused_id().map(str::to_string));
    }
    assert_eq!(
        seen,
        vec![Some("b".into()), Some("c".into()), Some("b".into())]
    );
}

// ============================================================================
// Midnight wraparound
// ============================================================================

#[test]
fn test_end_edge_dragged_past_midnight_lands_next_day() {
    let mut planner = planner(vec![block("late", at(22, 0), at(23, 30))]);
    assert!(planner.begin_drag(touch(23, 20)));
    planner.drag(touch(23, 50));
    planner.drag(touch(1, 10));
    let committed = planner.end_drag().unwrap();

    let next = day().succ_opt().unwrap().and_hms_opt(1, 0, 0).unwrap();
    assert_eq!(committed.end_time, next);
    assert_eq!(committed.duration(), chrono::Duration::hours(3));
    assert!(committed.crosses_midnight());
}

// ============================================================================
// Observers and feedback
// ============================================================================

#[test]
fn test_observer_sees_gesture_events_in_order() {
    let seen: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let mut planner = planner(vec![block("a", at(9, 0), at(10, 0))]);
    let log = Rc::clone(&seen);
    planner.subscribe(move |event| {
        let name = match event {
            EngineEvent::FocusChanged { .. } => "focus",
            EngineEvent::ModeChanged { .. } => "mode",
            EngineEvent::SnapTick { .. } => "tick",
            EngineEvent::BlockCommitted { .. } => "commit",
            _ => "other",
        };
        log.borrow_mut().push(name);
    });

    assert!(planner.begin_drag(touch(9, 50)));
    planner.drag(touch(10, 40));
    planner.end_drag();

    assert_eq!(*seen.borrow(), vec!["mode", "tick", "commit", "mode"]);
}

#[test]
fn test_each_focus_transition_fires_one_feedback() {
    let fired: Rc<RefCell<Vec<Feedback>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&fired);
    let mut planner = planner(vec![
        block("a", at(9, 0), at(10, 0)),
        block("b", at(15, 0), at(16, 0)),
    ])
    .with_feedback(move |f| sink.borrow_mut().push(f));

    planner.tap(touch(9, 30));
    planner.tap(touch(15, 30));
    planner.tap(touch(15, 30));
    planner.go_to_next_day();

    assert_eq!(
        *fired.borrow(),
        vec![
            Feedback::Focus,
            Feedback::Focus,
            Feedback::Unfocus,
            Feedback::DayChange
        ]
    );
    assert_eq!(planner.focus(), &RadialFocusState::Unfocused);
}

#[test]
fn test_snap_ticks_fire_once_per_slot() {
    let mut planner = planner(vec![block("a", at(9, 0), at(10, 0))]);
    planner.set_snap_interval(SnapInterval::Thirty);
    assert!(planner.begin_drag(touch(9, 50)));

    let ticks: Vec<bool> = [(10, 40), (10, 50), (11, 5), (11, 20), (11, 40)]
        .into_iter()
        .map(|(h, m)| planner.drag(touch(h, m)).is_some())
        .collect();
    assert_eq!(ticks, vec![true, false, true, false, true]);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_commit_persists_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("radialday.db");
    {
        let mut db = BlockDb::open_at(&path).unwrap();
        db.create_block(&block("a", at(9, 0), at(10, 0))).unwrap();
    }

    let db = BlockDb::open_at(&path).unwrap();
    let mut planner = DayPlanner::new(db, EngineConfig::default(), day());
    assert!(planner.begin_drag(touch(9, 50)));
    planner.drag(touch(11, 0));
    planner.end_drag().unwrap();
    drop(planner);

    let db = BlockDb::open_at(&path).unwrap();
    let stored = db.get_block("a").unwrap().unwrap();
    assert_eq!(stored.end_time, at(11, 0));
}

#[test]
fn test_commit_to_missing_row_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("radialday.db");
    let mut db = BlockDb::open_at(&path).unwrap();
    db.create_block(&block("a", at(9, 0), at(10, 0))).unwrap();

    let mut planner = DayPlanner::new(db, EngineConfig::default(), day());
    planner.store_mut().delete_block("a").unwrap();
    planner.drain_events();

    assert!(planner.begin_drag(touch(9, 50)));
    planner.drag(touch(11, 0));
    assert!(planner.end_drag().is_none());
    assert_eq!(planner.block("a").unwrap().end_time, at(10, 0));
    assert!(planner
        .drain_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::CommitRejected { .. })));
}
