//! # Radialday Core Library
//!
//! This library provides the interaction engine behind the Radialday planner,
//! a day planner whose blocks live on a circular 24-hour dial. Blocks are
//! placed, moved and resized by angle instead of list position. The
//! `radialday-cli` binary drives the same engine for scripting.
//!
//! ## Architecture
//!
//! - **Geometry**: pure time/angle/point conversions and ring hit-testing
//! - **Snap**: grid quantization and duration bounds
//! - **Interaction**: the focus/mode state machine that tells taps,
//!   long-presses, drags and resizes apart
//! - **Controller**: gesture sessions owning the uncommitted preview
//! - **Day**: the facade that loads a day and commits finished gestures
//! - **Storage**: SQLite block storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`DayPlanner`]: Day scheduling facade
//! - [`InteractionState`]: Focus and gesture-mode state machine
//! - [`GestureSession`]: One in-flight drag or resize
//! - [`BlockStore`]: Data-access contract, implemented by [`BlockDb`] and
//!   [`MemoryBlockStore`]
//! - [`EngineConfig`]: Engine configuration management

pub mod block;
pub mod conflict;
pub mod controller;
pub mod day;
pub mod error;
pub mod events;
pub mod geometry;
pub mod interaction;
pub mod snap;
pub mod stats;
pub mod storage;

pub use block::{BlockId, BlockSource, Category, TimeBlock};
pub use conflict::{conflict_pairs, detect_conflicts, overlapping_blocks, ConflictPair};
pub use controller::{DragController, GestureKind, GestureOutcome, GestureSession, SnapTick};
pub use day::{DayPlanner, DayStep};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::{EngineEvent, EventBus, Feedback, FeedbackSink, NoFeedback};
pub use geometry::{DialGeometry, Point, RingSector};
pub use interaction::{InteractionMode, InteractionState, LongPressOutcome, RadialFocusState};
pub use snap::{Edge, SnapInterval};
pub use stats::{compute_statistics, CategoryShare, DayStatistics};
pub use storage::{BlockDb, BlockStore, EngineConfig, MemoryBlockStore};
