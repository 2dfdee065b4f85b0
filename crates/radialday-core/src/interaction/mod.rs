//! Dial focus and gesture-mode state machine.

mod machine;
mod state;

pub use machine::{InteractionState, LongPressOutcome, DEFAULT_LONG_PRESS};
pub use state::{InteractionMode, RadialFocusState};
