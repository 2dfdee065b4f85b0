mod planner;

pub use planner::{DayPlanner, DayStep};
