pub mod block;
pub mod config;
pub mod day;
pub mod dial;

use chrono::{NaiveDate, NaiveTime};

/// `YYYY-MM-DD`, or today when absent.
pub fn parse_date(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}").into()),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// `HH:MM` wall-clock time.
pub fn parse_time(s: &str) -> Result<NaiveTime, Box<dyn std::error::Error>> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|e| format!("invalid time '{s}' (expected HH:MM): {e}").into())
}
