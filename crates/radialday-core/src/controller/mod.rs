//! Drag/resize controller.
//!
//! Turns raw touch points into gesture sessions. Whether a touch may start a
//! gesture depends on how it began:
//!
//! - after a long-press on the focused block, a drag moves the block;
//! - a plain drag starting on any block's ring band resizes the nearer edge.
//!
//! The controller never touches the authoritative block list. It hands back
//! a [`GestureSession`] whose preview the day planner commits or drops.

mod session;

pub use session::{
    classify_resize_edge, nearest_occurrence, GestureKind, GestureOutcome, GestureSession,
    SnapTick,
};

use chrono::NaiveDate;

use crate::block::TimeBlock;
use crate::geometry::{DialGeometry, Point};
use crate::interaction::InteractionMode;
use crate::snap::{Edge, SnapInterval};

/// How the touch that starts a gesture was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureTrigger {
    /// Drag following a long-press.
    LongPress,
    /// Drag starting without a hold.
    Drag,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DragController {
    dial: DialGeometry,
}

impl DragController {
    pub fn new(dial: DialGeometry) -> Self {
        Self { dial }
    }

    pub fn dial(&self) -> &DialGeometry {
        &self.dial
    }

    /// Classify a touch on `block` into a gesture kind.
    ///
    /// `None` when the touch misses the block's tolerant ring sector, or
    /// when a long-press drag targets an unfocused block.
    pub fn classify(
        &self,
        block: &TimeBlock,
        touch: Point,
        trigger: GestureTrigger,
        focused: bool,
    ) -> Option<GestureKind> {
        if !self.dial.touches(block, touch) {
            return None;
        }
        match trigger {
            GestureTrigger::LongPress if focused => Some(GestureKind::Move),
            GestureTrigger::LongPress => None,
            GestureTrigger::Drag => Some(GestureKind::Resize(classify_resize_edge(
                block,
                self.dial.angle_of(touch),
            ))),
        }
    }

    /// Open a session for an already classified gesture.
    pub fn begin(
        &self,
        block: &TimeBlock,
        kind: GestureKind,
        touch: Point,
        day: NaiveDate,
        snap: SnapInterval,
    ) -> GestureSession {
        tracing::debug!("begin {:?} on block {}", kind, block.id);
        match kind {
            GestureKind::Move => {
                GestureSession::begin_move(block, self.dial.angle_of(touch), day, snap)
            }
            GestureKind::Resize(edge) => GestureSession::begin_resize(block, edge, day, snap),
        }
    }

    pub fn update(&self, session: &mut GestureSession, touch: Point) -> Option<SnapTick> {
        session.update(self.dial.angle_of(touch))
    }
}

impl GestureKind {
    /// Interaction mode that represents this gesture on `block`.
    pub fn mode_for(&self, block: &TimeBlock) -> InteractionMode {
        let block_id = block.id.clone();
        match self {
            GestureKind::Move => InteractionMode::DraggingBlock {
                block_id,
                original_start: block.start_time,
            },
            GestureKind::Resize(Edge::Start) => InteractionMode::ResizingStart { block_id },
            GestureKind::Resize(Edge::End) => InteractionMode::ResizingEnd { block_id },
        }
    }
}
