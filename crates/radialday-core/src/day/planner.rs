//! Day scheduling facade.
//!
//! The planner owns the authoritative blocks of one visible day and wires
//! the dial together: touches are hit-tested against block arcs, routed
//! through the interaction state machine, and turned into gesture sessions
//! by the drag controller. Only a finished gesture writes to the store.
//!
//! ## Gesture lifecycle
//!
//! ```text
//! tap(p)                  focus toggle
//! long_press(p) x2        focus, then arm a move
//! begin_drag -> drag* -> end_drag | cancel_gesture
//! begin_day_swipe -> finish_day_swipe | cancel_gesture
//! ```
//!
//! Every observable change is pushed to the [`EventBus`]; haptic feedback
//! goes to the injected [`FeedbackSink`].

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};

use crate::block::{BlockId, Category, TimeBlock};
use crate::conflict::{detect_conflicts, overlapping_blocks};
use crate::controller::{DragController, GestureOutcome, GestureSession, GestureTrigger, SnapTick};
use crate::events::{EngineEvent, EventBus, Feedback, FeedbackSink, NoFeedback};
use crate::geometry::{self, Point};
use crate::interaction::{InteractionMode, InteractionState, LongPressOutcome, RadialFocusState};
use crate::snap::{self, Edge, SnapInterval};
use crate::stats::{compute_statistics, DayStatistics};
use crate::storage::{BlockStore, EngineConfig};

/// Direction of a day change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStep {
    Previous,
    Next,
}

pub struct DayPlanner<S: BlockStore> {
    store: S,
    config: EngineConfig,
    date: NaiveDate,
    blocks: Vec<TimeBlock>,
    categories: Vec<Category>,
    conflicts: BTreeSet<BlockId>,
    stats: DayStatistics,
    interaction: InteractionState,
    session: Option<GestureSession>,
    controller: DragController,
    snap: SnapInterval,
    now: Option<NaiveDateTime>,
    events: EventBus,
    feedback: Box<dyn FeedbackSink>,
}

impl<S: BlockStore> DayPlanner<S> {
    /// Create a planner showing `date`.
    pub fn new(store: S, config: EngineConfig, date: NaiveDate) -> Self {
        let mut planner = Self {
            store,
            controller: DragController::new(config.dial),
            interaction: InteractionState::new(config.long_press_threshold()),
            snap: config.snap_interval,
            config,
            date,
            blocks: Vec::new(),
            categories: Vec::new(),
            conflicts: BTreeSet::new(),
            stats: DayStatistics::default(),
            session: None,
            now: None,
            events: EventBus::new(),
            feedback: Box::new(NoFeedback),
        };
        planner.load_day(date);
        planner
    }

    pub fn with_feedback(mut self, sink: impl FeedbackSink + 'static) -> Self {
        self.feedback = Box::new(sink);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Committed blocks of the visible day.
    pub fn blocks(&self) -> &[TimeBlock] {
        &self.blocks
    }

    pub fn block(&self, id: &str) -> Option<&TimeBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn conflicts(&self) -> &BTreeSet<BlockId> {
        &self.conflicts
    }

    pub fn statistics(&self) -> &DayStatistics {
        &self.stats
    }

    pub fn focus(&self) -> &RadialFocusState {
        self.interaction.focus()
    }

    pub fn mode(&self) -> &InteractionMode {
        self.interaction.mode()
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn snap_interval(&self) -> SnapInterval {
        self.snap
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Angle of the "now" indicator, once a clock reading was supplied.
    pub fn now_angle(&self) -> Option<f64> {
        self.now.map(geometry::angle_from_instant)
    }

    /// Blocks as a renderer should draw them: the in-flight preview stands
    /// in for the block it edits.
    pub fn display_blocks(&self) -> Vec<&TimeBlock> {
        self.blocks
            .iter()
            .map(|b| match &self.session {
                Some(session) if session.block_id() == b.id => session.preview(),
                _ => b,
            })
            .collect()
    }

    /// Block under `point`.
    ///
    /// Where arcs overlap, the focused block wins, then the narrowest arc,
    /// then the latest start.
    pub fn block_at(&self, point: Point) -> Option<&TimeBlock> {
        let dial = self.controller.dial();
        let focused = self.interaction.focused_id();
        self.blocks
            .iter()
            .filter(|b| dial.touches(b, point))
            .min_by(|a, b| {
                let a_focused = focused == Some(a.id.as_str());
                let b_focused = focused == Some(b.id.as_str());
                b_focused
                    .cmp(&a_focused)
                    .then_with(|| a.sweep_angle().total_cmp(&b.sweep_angle()))
                    .then_with(|| b.start_time.cmp(&a.start_time))
            })
    }

    // ── Events ───────────────────────────────────────────────────────

    pub fn subscribe(&mut self, observer: impl FnMut(&EngineEvent) + 'static) {
        self.events.subscribe(observer);
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }

    // ── Day navigation ───────────────────────────────────────────────

    /// Show `date`: drop focus and any gesture, then fetch its blocks.
    ///
    /// A failed fetch leaves the day empty.
    pub fn load_day(&mut self, date: NaiveDate) {
        self.discard_session();
        let reset = self.interaction.reset();
        self.events.emit_all(reset);

        self.date = date;
        self.blocks = self.store.fetch_blocks(date).unwrap_or_else(|e| {
            tracing::warn!("failed to load blocks for {}: {}", date, e);
            Vec::new()
        });
        self.categories = self.store.fetch_categories().unwrap_or_else(|e| {
            tracing::warn!("failed to load categories: {}", e);
            Vec::new()
        });
        tracing::info!("loaded {} blocks for {}", self.blocks.len(), date);
        self.refresh_derived();
    }

    pub fn go_to_next_day(&mut self) {
        self.step_day(DayStep::Next);
    }

    pub fn go_to_previous_day(&mut self) {
        self.step_day(DayStep::Previous);
    }

    pub fn step_day(&mut self, step: DayStep) {
        let target = match step {
            DayStep::Next => self.date.succ_opt(),
            DayStep::Previous => self.date.pred_opt(),
        };
        let Some(date) = target else {
            tracing::warn!("no day {:?} of {}", step, self.date);
            return;
        };
        self.load_day(date);
        self.feedback.fire(Feedback::DayChange);
        self.events.emit(EngineEvent::DayChanged { date });
    }

    // ── Focus ────────────────────────────────────────────────────────

    /// Single tap. Returns the id of the block that was hit.
    pub fn tap(&mut self, point: Point) -> Option<BlockId> {
        if self.session.is_some() {
            tracing::debug!("tap ignored during a gesture");
            return None;
        }
        let id = self.block_at(point)?.id.clone();
        self.tap_block(&id);
        Some(id)
    }

    /// Toggle focus on a block by id.
    pub fn tap_block(&mut self, id: &str) {
        if self.block(id).is_none() {
            return;
        }
        let event = self.interaction.tap(id);
        self.emit_focus(event);
    }

    /// Double tap: cycle focus through the blocks overlapping the hit block.
    pub fn double_tap(&mut self, point: Point) -> Option<BlockId> {
        if self.session.is_some() {
            return None;
        }
        let id = self.block_at(point)?.id.clone();
        self.focus_next_overlapping(&id)
    }

    /// Focus the block after the focused one among those overlapping `from`.
    ///
    /// The candidates are ordered by start. When focus is not among them
    /// the earliest one is taken. Returns the newly focused id.
    pub fn focus_next_overlapping(&mut self, from: &str) -> Option<BlockId> {
        let from_block = self.block(from)?;
        let candidates: Vec<BlockId> = overlapping_blocks(from_block, &self.blocks)
            .into_iter()
            .map(|b| b.id.clone())
            .collect();
        let position = self
            .interaction
            .focused_id()
            .and_then(|focused| candidates.iter().position(|id| id == focused));
        let target = match position {
            Some(i) => candidates.get((i + 1) % candidates.len()),
            None => candidates.first(),
        }?
        .clone();

        let event = self.interaction.focus_on(&target);
        self.emit_focus(event);
        Some(target)
    }

    /// Long-press held for `held` at `point`.
    ///
    /// On an unfocused block this focuses it and asks the UI for its
    /// editor. On the focused block it arms a move.
    pub fn long_press(&mut self, point: Point, held: Duration) -> LongPressOutcome {
        if self.session.is_some() || !self.interaction.mode().is_idle() {
            return LongPressOutcome::TooShort;
        }
        let Some(id) = self.block_at(point).map(|b| b.id.clone()) else {
            return LongPressOutcome::TooShort;
        };
        let outcome = self.interaction.long_press(&id, held);
        match &outcome {
            LongPressOutcome::Focused(event) => {
                self.emit_focus(Some(event.clone()));
                self.events
                    .emit(EngineEvent::EditRequested { block_id: id });
            }
            LongPressOutcome::Armed(event) => self.events.emit(event.clone()),
            LongPressOutcome::TooShort => {}
        }
        outcome
    }

    // ── Gestures ─────────────────────────────────────────────────────

    /// Start a drag at `point`.
    ///
    /// After an armed long-press this moves the focused block; from `Idle`
    /// it resizes whichever block is under the finger. Returns whether a
    /// session started.
    pub fn begin_drag(&mut self, point: Point) -> bool {
        if self.session.is_some() {
            tracing::warn!("drag started while another gesture is active");
            return false;
        }
        let (trigger, block) = match self.interaction.mode() {
            InteractionMode::LongPressing { block_id } => {
                (GestureTrigger::LongPress, self.block(block_id).cloned())
            }
            InteractionMode::Idle => (GestureTrigger::Drag, self.block_at(point).cloned()),
            _ => return false,
        };
        let Some(block) = block else {
            self.end_mode();
            return false;
        };

        let focused = self.interaction.focus().is_focused_on(&block.id);
        let Some(kind) = self.controller.classify(&block, point, trigger, focused) else {
            self.end_mode();
            return false;
        };

        let session = self
            .controller
            .begin(&block, kind, point, self.date, self.snap);
        let event = self.interaction.enter_mode(kind.mode_for(&block));
        self.events.emit_all(event);
        self.session = Some(session);
        true
    }

    /// Feed a touch sample to the running gesture.
    pub fn drag(&mut self, point: Point) -> Option<SnapTick> {
        let session = self.session.as_mut()?;
        let tick = self.controller.update(session, point)?;
        self.feedback.fire(Feedback::SnapTick);
        self.events.emit(EngineEvent::SnapTick {
            block_id: tick.block_id.clone(),
            angle: tick.angle,
            at: tick.at,
        });
        Some(tick)
    }

    /// Release the finger. Returns the committed block, if any.
    ///
    /// A store failure keeps the last committed block and emits
    /// `CommitRejected`.
    pub fn end_drag(&mut self) -> Option<TimeBlock> {
        let Some(session) = self.session.take() else {
            self.end_mode();
            return None;
        };
        let block_id = session.block_id().to_string();
        let committed = match session.finish() {
            GestureOutcome::Commit(preview) => {
                // only the times come from the gesture; other fields may have
                // been edited while it ran
                let block = match self.block(&block_id) {
                    Some(current) => TimeBlock {
                        start_time: preview.start_time,
                        end_time: preview.end_time,
                        ..current.clone()
                    },
                    None => preview,
                };
                self.commit(block)
            }
            GestureOutcome::Discard => {
                tracing::debug!("gesture on {} ended without change", block_id);
                None
            }
        };
        self.end_mode();
        committed
    }

    /// Abandon the running gesture, if any, and return to `Idle`.
    pub fn cancel_gesture(&mut self) {
        self.discard_session();
        self.end_mode();
    }

    /// Enter `SwipingDay`, discarding any block gesture first.
    pub fn begin_day_swipe(&mut self) {
        self.cancel_gesture();
        let event = self.interaction.enter_mode(InteractionMode::SwipingDay);
        self.events.emit_all(event);
    }

    pub fn finish_day_swipe(&mut self, step: DayStep) {
        self.end_mode();
        self.step_day(step);
    }

    // ── Block edits ──────────────────────────────────────────────────

    /// Persist a new block with its duration clamped into `[snap, 24h]`.
    ///
    /// Returns the stored block. A store failure is logged and changes nothing.
    pub fn create_block(&mut self, mut block: TimeBlock) -> Option<TimeBlock> {
        let (start, end) =
            snap::clamp_duration(block.start_time, block.effective_end(), self.snap, Edge::End);
        block.start_time = start;
        block.end_time = end;

        let stored = match self.store.create_block(&block) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("failed to create block {}: {}", block.id, e);
                return None;
            }
        };
        tracing::info!("created block {} at {}", stored.id, stored.start_time);
        if stored.start_time.date() == self.date {
            self.blocks.push(stored.clone());
            self.blocks
                .sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
            self.refresh_derived();
        }
        self.events.emit(EngineEvent::BlockCreated {
            block: stored.clone(),
        });
        Some(stored)
    }

    /// Delete a block. Returns whether the store removed it.
    pub fn delete_block(&mut self, id: &str) -> bool {
        match self.store.delete_block(id) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("block {} was not stored", id);
                return false;
            }
            Err(e) => {
                tracing::warn!("failed to delete block {}: {}", id, e);
                return false;
            }
        }
        if self.session.as_ref().is_some_and(|s| s.block_id() == id)
            || self.interaction.mode().block_id() == Some(id)
        {
            self.cancel_gesture();
        }
        if self.interaction.focus().is_focused_on(id) {
            let event = self.interaction.clear_focus();
            self.emit_focus(event);
        }
        self.blocks.retain(|b| b.id != id);
        self.refresh_derived();
        self.events.emit(EngineEvent::BlockDeleted {
            block_id: id.to_string(),
        });
        true
    }

    /// Flip the completion flag. Returns the stored block.
    pub fn toggle_completed(&mut self, id: &str) -> Option<TimeBlock> {
        let mut updated = self.block(id)?.clone();
        updated.done = !updated.done;
        self.commit(updated)
    }

    /// Record the current wall-clock time for the "now" indicator.
    pub fn refresh_now(&mut self, now: NaiveDateTime) {
        self.now = Some(now);
    }

    /// Grid for gestures started from now on.
    pub fn set_snap_interval(&mut self, interval: SnapInterval) {
        self.snap = interval;
        self.config.snap_interval = interval;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn commit(&mut self, block: TimeBlock) -> Option<TimeBlock> {
        match self.store.update_block(&block) {
            Ok(stored) => {
                tracing::info!(
                    "committed block {} [{} - {}]",
                    stored.id,
                    stored.start_time,
                    stored.end_time
                );
                if let Some(slot) = self.blocks.iter_mut().find(|b| b.id == stored.id) {
                    *slot = stored.clone();
                }
                self.refresh_derived();
                self.events.emit(EngineEvent::BlockCommitted {
                    block: stored.clone(),
                });
                Some(stored)
            }
            Err(e) => {
                tracing::warn!("commit of block {} rejected: {}", block.id, e);
                self.events.emit(EngineEvent::CommitRejected {
                    block_id: block.id,
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn discard_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.cancel();
        }
    }

    fn end_mode(&mut self) {
        let event = self.interaction.end_gesture();
        self.events.emit_all(event);
    }

    /// Forward a focus event with its matching feedback signal.
    fn emit_focus(&mut self, event: Option<EngineEvent>) {
        let Some(event) = event else {
            return;
        };
        if let EngineEvent::FocusChanged { to, .. } = &event {
            let feedback = match to {
                RadialFocusState::Focused(_) => Feedback::Focus,
                RadialFocusState::Unfocused => Feedback::Unfocus,
            };
            self.feedback.fire(feedback);
        }
        self.events.emit(event);
    }

    fn refresh_derived(&mut self) {
        self.stats = compute_statistics(&self.blocks);
        let conflicts = detect_conflicts(&self.blocks);
        if conflicts != self.conflicts {
            self.conflicts = conflicts;
            self.events.emit(EngineEvent::ConflictsChanged {
                block_ids: self.conflicts.clone(),
            });
        }
    }
}
