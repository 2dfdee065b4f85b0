//! Angle/time conversions on the 24-hour dial.

use clap::Subcommand;
use radialday_core::geometry;

use super::{parse_date, parse_time};

#[derive(Subcommand)]
pub enum DialAction {
    /// Dial angle of a wall-clock time
    Angle {
        /// Time as HH:MM
        time: String,
    },
    /// Wall-clock time at a dial angle
    Time {
        /// Angle in degrees, 0 = midnight, clockwise
        #[arg(allow_hyphen_values = true)]
        degrees: f64,
        /// Date (YYYY-MM-DD) to print the full instant for
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: DialAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DialAction::Angle { time } => {
            let time = parse_time(&time)?;
            println!("{:.2}", geometry::angle_from_time(time));
        }
        DialAction::Time { degrees, date } => {
            let show_date = date.is_some();
            let instant = geometry::instant_from_angle(degrees, parse_date(date.as_deref())?);
            if show_date {
                println!("{}", instant.format("%Y-%m-%dT%H:%M:%S"));
            } else {
                println!("{}", instant.format("%H:%M:%S"));
            }
        }
    }
    Ok(())
}
