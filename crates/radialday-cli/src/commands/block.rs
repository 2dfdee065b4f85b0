//! Block management commands for CLI.
//!
//! `move` and `resize` replay the touch gestures a dial UI would send, so
//! they go through the same snapping and clamping as a real drag.

use clap::{Subcommand, ValueEnum};
use radialday_core::geometry::{self, DialGeometry};
use radialday_core::{BlockDb, DayPlanner, Edge, EngineConfig, EngineEvent, TimeBlock};

use super::{parse_date, parse_time};

#[derive(Clone, Copy, ValueEnum)]
pub enum EdgeArg {
    Start,
    End,
}

impl From<EdgeArg> for Edge {
    fn from(edge: EdgeArg) -> Self {
        match edge {
            EdgeArg::Start => Edge::Start,
            EdgeArg::End => Edge::End,
        }
    }
}

#[derive(Subcommand)]
pub enum BlockAction {
    /// Add a block
    Add {
        /// Block title
        title: String,
        /// Start time as HH:MM
        #[arg(long)]
        start: String,
        /// End time as HH:MM; an end before the start crosses midnight
        #[arg(long)]
        end: String,
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Category ID
        #[arg(long)]
        category: Option<String>,
        /// Emoji shown on the dial
        #[arg(long)]
        emoji: Option<String>,
    },
    /// Delete a block
    Delete {
        /// Block ID
        id: String,
    },
    /// Toggle a block's completion flag
    Done {
        /// Block ID
        id: String,
    },
    /// Move a block so that it starts at a new time
    Move {
        /// Block ID
        id: String,
        /// New start time as HH:MM
        #[arg(long)]
        to: String,
    },
    /// Drag one edge of a block to a new time
    Resize {
        /// Block ID
        id: String,
        /// Edge to drag
        #[arg(long, value_enum)]
        edge: EdgeArg,
        /// New edge time as HH:MM
        #[arg(long)]
        to: String,
    },
}

pub fn run(action: BlockAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load()?;

    match action {
        BlockAction::Add {
            title,
            start,
            end,
            date,
            category,
            emoji,
        } => {
            let date = parse_date(date.as_deref())?;
            let mut block = TimeBlock::new(
                title,
                date.and_time(parse_time(&start)?),
                date.and_time(parse_time(&end)?),
            );
            block.category_id = category;
            block.emoji = emoji;

            let mut planner = DayPlanner::new(BlockDb::open()?, config, date);
            let created = planner
                .create_block(block)
                .ok_or("failed to create block")?;
            println!("Block created: {}", created.id);
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        BlockAction::Delete { id } => {
            let mut planner = planner_for(&id, config)?;
            if !planner.delete_block(&id) {
                return Err(format!("failed to delete block: {id}").into());
            }
            println!("Block deleted: {id}");
        }
        BlockAction::Done { id } => {
            let mut planner = planner_for(&id, config)?;
            let Some(updated) = planner.toggle_completed(&id) else {
                let reason = rejection(&mut planner, &id)
                    .unwrap_or_else(|| format!("block not found: {id}"));
                return Err(reason.into());
            };
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        BlockAction::Move { id, to } => {
            let to = parse_time(&to)?;
            let mut planner = planner_for(&id, config)?;
            let dial = planner.config().dial;
            let block = current(&planner, &id)?;

            // grab the middle of the arc and keep that offset while dragging
            let offset = block.sweep_angle() / 2.0;
            let grab = dial.point_at(block.start_angle() + offset);
            let hold = planner.config().long_press_threshold();
            tracing::debug!(%id, from = block.start_angle(), offset, "replaying move gesture");
            planner.tap_block(&id);
            planner.long_press(grab, hold);
            if !planner.begin_drag(grab) {
                return Err(format!("block {id} cannot be moved").into());
            }
            planner.drag(dial.point_at(geometry::angle_from_time(to) + offset));
            finish(&mut planner, &id)?;
        }
        BlockAction::Resize { id, edge, to } => {
            let to = parse_time(&to)?;
            let mut planner = planner_for(&id, config)?;
            let dial = planner.config().dial;
            let block = current(&planner, &id)?;

            let grab = edge_grab_point(&dial, &block, edge.into());
            tracing::debug!(%id, x = grab.x, y = grab.y, "replaying resize gesture");
            planner.tap_block(&id);
            if !planner.begin_drag(grab) {
                return Err(format!("block {id} cannot be resized").into());
            }
            planner.drag(dial.point_at(geometry::angle_from_time(to)));
            finish(&mut planner, &id)?;
        }
    }
    Ok(())
}

/// Planner showing the day a stored block starts on.
fn planner_for(
    id: &str,
    config: EngineConfig,
) -> Result<DayPlanner<BlockDb>, Box<dyn std::error::Error>> {
    let db = BlockDb::open()?;
    let block = db
        .get_block(id)?
        .ok_or_else(|| format!("block not found: {id}"))?;
    Ok(DayPlanner::new(db, config, block.start_time.date()))
}

fn current(
    planner: &DayPlanner<BlockDb>,
    id: &str,
) -> Result<TimeBlock, Box<dyn std::error::Error>> {
    planner
        .block(id)
        .cloned()
        .ok_or_else(|| format!("block not found: {id}").into())
}

/// A point on the quarter of the arc nearest `edge`.
fn edge_grab_point(dial: &DialGeometry, block: &TimeBlock, edge: Edge) -> radialday_core::Point {
    let quarter = block.sweep_angle() / 4.0;
    let angle = match edge {
        Edge::Start => block.start_angle() + quarter,
        Edge::End => block.start_angle() + 3.0 * quarter,
    };
    dial.point_at(angle)
}

fn finish(planner: &mut DayPlanner<BlockDb>, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    match planner.end_drag() {
        Some(committed) => {
            println!("{}", serde_json::to_string_pretty(&committed)?);
            Ok(())
        }
        None => match rejection(planner, id) {
            Some(reason) => Err(reason.into()),
            None => {
                println!("Block unchanged: {id}");
                Ok(())
            }
        },
    }
}

/// Reason of the last rejected commit for `id`, if any.
fn rejection(planner: &mut DayPlanner<BlockDb>, id: &str) -> Option<String> {
    planner.drain_events().into_iter().find_map(|event| match event {
        EngineEvent::CommitRejected { block_id, reason } if block_id == id => {
            Some(format!("commit rejected: {reason}"))
        }
        _ => None,
    })
}
