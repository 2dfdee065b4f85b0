//! Focus and interaction-mode types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::block::BlockId;

/// Which block, if any, is zoomed in on the dial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "block_id", rename_all = "snake_case")]
pub enum RadialFocusState {
    #[default]
    Unfocused,
    Focused(BlockId),
}

impl RadialFocusState {
    pub fn focused_id(&self) -> Option<&str> {
        match self {
            Self::Unfocused => None,
            Self::Focused(id) => Some(id),
        }
    }

    pub fn is_focused_on(&self, block_id: &str) -> bool {
        self.focused_id() == Some(block_id)
    }
}

/// The gesture currently in progress. At most one is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Idle,
    DraggingBlock {
        block_id: BlockId,
        original_start: NaiveDateTime,
    },
    ResizingStart {
        block_id: BlockId,
    },
    ResizingEnd {
        block_id: BlockId,
    },
    LongPressing {
        block_id: BlockId,
    },
    SwipingDay,
}

impl InteractionMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Block the mode acts on, if any.
    pub fn block_id(&self) -> Option<&str> {
        match self {
            Self::DraggingBlock { block_id, .. }
            | Self::ResizingStart { block_id }
            | Self::ResizingEnd { block_id }
            | Self::LongPressing { block_id } => Some(block_id),
            Self::Idle | Self::SwipingDay => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DraggingBlock { .. } => "dragging_block",
            Self::ResizingStart { .. } => "resizing_start",
            Self::ResizingEnd { .. } => "resizing_end",
            Self::LongPressing { .. } => "long_pressing",
            Self::SwipingDay => "swiping_day",
        }
    }

    /// A held long-press turns into a drag or resize of the same block.
    /// Every other non-idle to non-idle change skips the mandatory `Idle`.
    pub fn can_promote_to(&self, next: &InteractionMode) -> bool {
        match (self, next) {
            (Self::LongPressing { block_id }, Self::DraggingBlock { block_id: next_id, .. })
            | (Self::LongPressing { block_id }, Self::ResizingStart { block_id: next_id })
            | (Self::LongPressing { block_id }, Self::ResizingEnd { block_id: next_id }) => {
                block_id == next_id
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_serializes_with_payload() {
        let json = serde_json::to_string(&RadialFocusState::Focused("b1".into())).unwrap();
        assert_eq!(json, r#"{"state":"focused","block_id":"b1"}"#);
        let back: RadialFocusState = serde_json::from_str(&json).unwrap();
        assert!(back.is_focused_on("b1"));
    }

    #[test]
    fn long_press_promotes_only_for_same_block() {
        let pressing = InteractionMode::LongPressing {
            block_id: "a".into(),
        };
        assert!(pressing.can_promote_to(&InteractionMode::ResizingEnd {
            block_id: "a".into()
        }));
        assert!(!pressing.can_promote_to(&InteractionMode::ResizingEnd {
            block_id: "b".into()
        }));
        assert!(!pressing.can_promote_to(&InteractionMode::SwipingDay));
        assert!(!InteractionMode::SwipingDay.can_promote_to(&pressing));
    }
}
