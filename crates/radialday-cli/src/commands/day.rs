//! Day overview commands for CLI.

use clap::Subcommand;
use radialday_core::{BlockDb, DayPlanner, EngineConfig, TimeBlock};
use serde::Serialize;

use super::parse_date;

#[derive(Subcommand)]
pub enum DayAction {
    /// Show the blocks of a day with their dial angles
    Show {
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show scheduled time per category
    Stats {
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct BlockView<'a> {
    #[serde(flatten)]
    block: &'a TimeBlock,
    start_angle: f64,
    sweep_angle: f64,
    conflict: bool,
}

#[derive(Serialize)]
struct DayView<'a> {
    date: chrono::NaiveDate,
    blocks: Vec<BlockView<'a>>,
    conflicts: Vec<&'a str>,
}

pub fn run(action: DayAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DayAction::Show { date, json } => {
            let planner = open_day(date.as_deref())?;
            let conflicts = planner.conflicts();
            let view = DayView {
                date: planner.date(),
                blocks: planner
                    .blocks()
                    .iter()
                    .map(|block| BlockView {
                        block,
                        start_angle: block.start_angle(),
                        sweep_angle: block.sweep_angle(),
                        conflict: conflicts.contains(&block.id),
                    })
                    .collect(),
                conflicts: conflicts.iter().map(String::as_str).collect(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }
            println!("{}", view.date);
            if view.blocks.is_empty() {
                println!("  (no blocks)");
            }
            for entry in &view.blocks {
                let b = entry.block;
                println!(
                    "  {}-{}  {:>6.2}° +{:>6.2}°  {}{}{}  [{}]",
                    b.start_time.format("%H:%M"),
                    b.effective_end().format("%H:%M"),
                    entry.start_angle,
                    entry.sweep_angle,
                    if b.done { "✓ " } else { "" },
                    b.emoji.as_deref().map(|e| format!("{e} ")).unwrap_or_default(),
                    b.title,
                    b.id,
                );
            }
            if !view.conflicts.is_empty() {
                println!("conflicts: {}", view.conflicts.join(", "));
            }
        }
        DayAction::Stats { date, json } => {
            let planner = open_day(date.as_deref())?;
            let stats = planner.statistics();
            if json {
                println!("{}", serde_json::to_string_pretty(stats)?);
                return Ok(());
            }
            println!("Date:      {}", planner.date());
            println!("Scheduled: {}m", stats.total().num_minutes());
            println!("Completed: {}/{}", stats.completed, stats.block_count);
            for share in &stats.by_category {
                println!(
                    "  {:<16} {:>5}m  ({} blocks)",
                    share.category_id.as_deref().unwrap_or("(none)"),
                    share.duration().num_minutes(),
                    share.block_count,
                );
            }
        }
    }
    Ok(())
}

fn open_day(date: Option<&str>) -> Result<DayPlanner<BlockDb>, Box<dyn std::error::Error>> {
    let date = parse_date(date)?;
    let db = BlockDb::open()?;
    Ok(DayPlanner::new(db, EngineConfig::load()?, date))
}
