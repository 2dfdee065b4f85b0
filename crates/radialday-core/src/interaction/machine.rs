//! Interaction state machine.
//!
//! Focus and mode are orthogonal: focus says which block is selected, the
//! mode says which gesture is running. Focus gates the long-press drag path
//! only; resizes start from any block.
//!
//! ## Focus transitions
//!
//! ```text
//! Unfocused  --tap(a) / long-press(a)-->  Focused(a)
//! Focused(a) --tap(a) / day change----->  Unfocused
//! Focused(a) --tap(b) / double-tap----->  Focused(b)
//! ```
//!
//! ## Mode transitions
//!
//! ```text
//! Idle -> LongPressing(a) -> DraggingBlock(a) -> Idle
//! Idle -> ResizingStart(a) | ResizingEnd(a)   -> Idle
//! Idle -> SwipingDay                          -> Idle
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::state::{InteractionMode, RadialFocusState};
use crate::events::EngineEvent;

/// Default hold time before a press counts as a long-press.
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(600);

/// Result of a long-press on a block.
#[derive(Debug, Clone, PartialEq)]
pub enum LongPressOutcome {
    /// Released before the threshold; nothing changes.
    TooShort,
    /// The block was not focused and now is.
    Focused(EngineEvent),
    /// The block was already focused; a drag may follow.
    Armed(EngineEvent),
}

/// Focus plus the single active interaction mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionState {
    focus: RadialFocusState,
    mode: InteractionMode,
    #[serde(with = "millis")]
    long_press_threshold: Duration,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_PRESS)
    }
}

impl InteractionState {
    pub fn new(long_press_threshold: Duration) -> Self {
        Self {
            focus: RadialFocusState::Unfocused,
            mode: InteractionMode::Idle,
            long_press_threshold,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn focus(&self) -> &RadialFocusState {
        &self.focus
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.focus.focused_id()
    }

    pub fn long_press_threshold(&self) -> Duration {
        self.long_press_threshold
    }

    // ── Focus commands ───────────────────────────────────────────────

    /// Single tap: toggles focus on the tapped block.
    pub fn tap(&mut self, block_id: &str) -> Option<EngineEvent> {
        if self.focus.is_focused_on(block_id) {
            self.set_focus(RadialFocusState::Unfocused)
        } else {
            self.set_focus(RadialFocusState::Focused(block_id.to_string()))
        }
    }

    /// Focus `block_id`; no event if it already is.
    pub fn focus_on(&mut self, block_id: &str) -> Option<EngineEvent> {
        self.set_focus(RadialFocusState::Focused(block_id.to_string()))
    }

    pub fn clear_focus(&mut self) -> Option<EngineEvent> {
        self.set_focus(RadialFocusState::Unfocused)
    }

    /// Long-press on a block held for `held`.
    ///
    /// An unfocused block gets focus. The focused block arms a drag by
    /// entering `LongPressing`.
    pub fn long_press(&mut self, block_id: &str, held: Duration) -> LongPressOutcome {
        if held < self.long_press_threshold {
            return LongPressOutcome::TooShort;
        }
        if self.focus.is_focused_on(block_id) {
            match self.enter_mode(InteractionMode::LongPressing {
                block_id: block_id.to_string(),
            }) {
                Some(event) => LongPressOutcome::Armed(event),
                None => LongPressOutcome::TooShort,
            }
        } else {
            match self.focus_on(block_id) {
                Some(event) => LongPressOutcome::Focused(event),
                None => LongPressOutcome::TooShort,
            }
        }
    }

    // ── Mode commands ────────────────────────────────────────────────

    /// Switch to `next`.
    ///
    /// Leaving one gesture for another without passing through `Idle` is a
    /// programmer error: it panics in debug builds and otherwise keeps the
    /// most recent mode.
    pub fn enter_mode(&mut self, next: InteractionMode) -> Option<EngineEvent> {
        if self.mode == next {
            return None;
        }
        if !self.mode.is_idle() && !next.is_idle() && !self.mode.can_promote_to(&next) {
            debug_assert!(
                false,
                "interaction mode {} entered while {} is active",
                next.as_str(),
                self.mode.as_str()
            );
            tracing::warn!(
                "interaction mode {} replaced active {}",
                next.as_str(),
                self.mode.as_str()
            );
        }
        let from = std::mem::replace(&mut self.mode, next);
        tracing::debug!("interaction mode {} -> {}", from.as_str(), self.mode.as_str());
        Some(EngineEvent::ModeChanged {
            from,
            to: self.mode.clone(),
        })
    }

    /// Back to `Idle` after a gesture ends, committed or not.
    pub fn end_gesture(&mut self) -> Option<EngineEvent> {
        self.enter_mode(InteractionMode::Idle)
    }

    /// Drop focus and any gesture, as when a new day is shown.
    pub fn reset(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        events.extend(self.end_gesture());
        events.extend(self.clear_focus());
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_focus(&mut self, next: RadialFocusState) -> Option<EngineEvent> {
        if self.focus == next {
            return None;
        }
        let from = std::mem::replace(&mut self.focus, next);
        Some(EngineEvent::FocusChanged {
            from,
            to: self.focus.clone(),
        })
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
