use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::block::{BlockId, TimeBlock};
use crate::interaction::{InteractionMode, RadialFocusState};

/// Every observable state change in the engine produces an Event.
/// A UI layer either polls the planner's queue or registers an observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineEvent {
    FocusChanged {
        from: RadialFocusState,
        to: RadialFocusState,
    },
    ModeChanged {
        from: InteractionMode,
        to: InteractionMode,
    },
    /// The snapped position under the finger moved to a new grid slot.
    SnapTick {
        block_id: BlockId,
        angle: f64,
        at: NaiveDateTime,
    },
    DayChanged {
        date: NaiveDate,
    },
    ConflictsChanged {
        block_ids: BTreeSet<BlockId>,
    },
    BlockCommitted {
        block: TimeBlock,
    },
    /// The store refused a commit; the last committed block stays.
    CommitRejected {
        block_id: BlockId,
        reason: String,
    },
    BlockCreated {
        block: TimeBlock,
    },
    BlockDeleted {
        block_id: BlockId,
    },
    /// A long-press on an unfocused block asks the UI for its editor.
    EditRequested {
        block_id: BlockId,
    },
}

/// Tactile/notification feedback categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Focus,
    Unfocus,
    DayChange,
    SnapTick,
}

/// Capability the engine calls to trigger haptics. The engine never
/// produces the haptic itself.
pub trait FeedbackSink {
    fn fire(&mut self, feedback: Feedback);
}

impl<F: FnMut(Feedback)> FeedbackSink for F {
    fn fire(&mut self, feedback: Feedback) {
        self(feedback)
    }
}

/// Sink that drops every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl FeedbackSink for NoFeedback {
    fn fire(&mut self, _feedback: Feedback) {}
}

/// Oldest queued events are dropped past this size.
const MAX_PENDING_EVENTS: usize = 512;

type Observer = Box<dyn FnMut(&EngineEvent)>;

/// Observer registry plus a pollable queue, owned by the day planner.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Observer>,
    pending: VecDeque<EngineEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&EngineEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn emit(&mut self, event: EngineEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
        if self.pending.len() == MAX_PENDING_EVENTS {
            self.pending.pop_front();
        }
        self.pending.push_back(event);
    }

    pub fn emit_all(&mut self, events: impl IntoIterator<Item = EngineEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        self.pending.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
