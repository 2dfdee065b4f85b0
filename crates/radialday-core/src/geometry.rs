//! Angle-time geometry for the 24-hour dial.
//!
//! A day maps onto one full turn: 0° is midnight at the top of the dial and
//! angles grow clockwise, so 15° is one hour and 90° is 06:00.
//!
//! Points use screen coordinates (y grows downward). Every function here is
//! pure; malformed angles (NaN, infinities) normalize to 0° instead of
//! failing, since all of the math is modular anyway.
//!
//! Arc hit-testing treats both boundaries as inside, for the start edge and
//! the end edge alike, and both ring radii as inside.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// A point in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Fold any angle into `[0, 360)`. Non-finite input yields 0.
pub fn normalize_angle(deg: f64) -> f64 {
    if !deg.is_finite() {
        return 0.0;
    }
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest unsigned distance between two angles, in `[0, 180]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let delta = normalize_angle(a - b);
    delta.min(360.0 - delta)
}

pub fn angle_from_time(time: NaiveTime) -> f64 {
    time.num_seconds_from_midnight() as f64 * 360.0 / SECONDS_PER_DAY as f64
}

/// Dial angle of an instant's time of day, in `[0, 360)`.
pub fn angle_from_instant(instant: NaiveDateTime) -> f64 {
    angle_from_time(instant.time())
}

/// Instant on `date` whose time of day sits at `angle`.
///
/// Rounds to the nearest second. An angle that rounds up to 24:00:00 folds
/// back to midnight of the same `date`.
pub fn instant_from_angle(angle: f64, date: NaiveDate) -> NaiveDateTime {
    let secs = (normalize_angle(angle) * SECONDS_PER_DAY as f64 / 360.0).round() as i64;
    date.and_time(NaiveTime::MIN) + Duration::seconds(secs % SECONDS_PER_DAY)
}

/// Angle of `point` as seen from `center`, 0° pointing up.
pub fn point_to_angle(point: Point, center: Point) -> f64 {
    let dy = point.y - center.y;
    let dx = point.x - center.x;
    normalize_angle(dy.atan2(dx).to_degrees() + 90.0)
}

pub fn angle_to_point(angle: f64, radius: f64, center: Point) -> Point {
    let radians = (normalize_angle(angle) - 90.0) * std::f64::consts::PI / 180.0;
    Point::new(
        center.x + radius * radians.cos(),
        center.y + radius * radians.sin(),
    )
}

/// Clockwise angular width from `start` to `end`.
///
/// In `(0, 360)` for distinct angles; the degenerate `start == end` yields 0
/// because angles alone cannot tell an empty span from a full day. Blocks
/// resolve that through their duration, see [`TimeBlock::sweep_angle`].
///
/// [`TimeBlock::sweep_angle`]: crate::block::TimeBlock::sweep_angle
pub fn sweep_angle(start: f64, end: f64) -> f64 {
    let mut sweep = normalize_angle(end) - normalize_angle(start);
    if sweep < 0.0 {
        sweep += 360.0;
    }
    sweep
}

/// Whether `angle` lies on the clockwise arc `[start, end]`, inclusive.
pub fn angle_in_arc(angle: f64, start: f64, end: f64) -> bool {
    let angle = normalize_angle(angle);
    let start = normalize_angle(start);
    let end = normalize_angle(end);
    if start <= end {
        angle >= start && angle <= end
    } else {
        angle >= start || angle <= end
    }
}

/// An annular sector of the dial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSector {
    pub start_angle: f64,
    pub end_angle: f64,
    pub sweep: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl RingSector {
    pub fn new(start_angle: f64, end_angle: f64, inner_radius: f64, outer_radius: f64) -> Self {
        Self {
            start_angle: normalize_angle(start_angle),
            end_angle: normalize_angle(end_angle),
            sweep: sweep_angle(start_angle, end_angle),
            inner_radius,
            outer_radius,
        }
    }

    /// Sector with an explicit sweep, needed for full-day spans.
    pub fn with_sweep(start_angle: f64, sweep: f64, inner_radius: f64, outer_radius: f64) -> Self {
        let sweep = if sweep.is_finite() { sweep.clamp(0.0, 360.0) } else { 0.0 };
        Self {
            start_angle: normalize_angle(start_angle),
            end_angle: normalize_angle(start_angle + sweep),
            sweep,
            inner_radius,
            outer_radius,
        }
    }

    /// Grow the radial band by `tolerance` on both sides.
    pub fn expanded(&self, tolerance: f64) -> Self {
        Self {
            inner_radius: (self.inner_radius - tolerance).max(0.0),
            outer_radius: self.outer_radius + tolerance,
            ..*self
        }
    }

    pub fn contains_angle(&self, angle: f64) -> bool {
        self.sweep >= 360.0 || angle_in_arc(angle, self.start_angle, self.end_angle)
    }

    pub fn contains_radius(&self, radius: f64) -> bool {
        radius >= self.inner_radius && radius <= self.outer_radius
    }

    pub fn contains(&self, point: Point, center: Point) -> bool {
        self.contains_radius(point.distance_to(center))
            && self.contains_angle(point_to_angle(point, center))
    }

    /// Angle halfway along the clockwise sweep.
    pub fn mid_angle(&self) -> f64 {
        normalize_angle(self.start_angle + self.sweep / 2.0)
    }
}

/// Physical layout of the dial ring in screen points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DialGeometry {
    #[serde(default = "default_center")]
    pub center: Point,
    #[serde(default = "default_inner_radius")]
    pub inner_radius: f64,
    #[serde(default = "default_outer_radius")]
    pub outer_radius: f64,
    /// Slack around the ring band that still counts as touching a block.
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,
}

fn default_center() -> Point {
    Point::new(200.0, 200.0)
}
fn default_inner_radius() -> f64 {
    110.0
}
fn default_outer_radius() -> f64 {
    170.0
}
fn default_hit_tolerance() -> f64 {
    20.0
}

impl Default for DialGeometry {
    fn default() -> Self {
        Self {
            center: default_center(),
            inner_radius: default_inner_radius(),
            outer_radius: default_outer_radius(),
            hit_tolerance: default_hit_tolerance(),
        }
    }
}

impl DialGeometry {
    /// Ring sector covered by a block, without tolerance.
    pub fn sector_for(&self, block: &crate::block::TimeBlock) -> RingSector {
        RingSector::with_sweep(
            block.start_angle(),
            block.sweep_angle(),
            self.inner_radius,
            self.outer_radius,
        )
    }

    /// Whether `point` falls in the ring band widened by the hit tolerance.
    pub fn in_touch_band(&self, point: Point) -> bool {
        let radius = point.distance_to(self.center);
        radius >= (self.inner_radius - self.hit_tolerance).max(0.0)
            && radius <= self.outer_radius + self.hit_tolerance
    }

    /// Whether `point` touches `block`: inside the tolerant band and on its arc.
    pub fn touches(&self, block: &crate::block::TimeBlock, point: Point) -> bool {
        self.sector_for(block)
            .expanded(self.hit_tolerance)
            .contains(point, self.center)
    }

    pub fn angle_of(&self, point: Point) -> f64 {
        point_to_angle(point, self.center)
    }

    /// Point on the middle of the ring band at `angle`.
    pub fn point_at(&self, angle: f64) -> Point {
        angle_to_point(angle, (self.inner_radius + self.outer_radius) / 2.0, self.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn clock_positions() {
        assert_eq!(angle_from_instant(hm(0, 0)), 0.0);
        assert_eq!(angle_from_instant(hm(6, 0)), 90.0);
        assert_eq!(angle_from_instant(hm(12, 0)), 180.0);
        assert_eq!(angle_from_instant(hm(22, 0)), 330.0);
        assert_eq!(angle_from_instant(hm(2, 0)), 30.0);
    }

    #[test]
    fn angle_wraps_before_conversion() {
        assert_eq!(instant_from_angle(360.0, day()), hm(0, 0));
        assert_eq!(instant_from_angle(-15.0, day()), hm(23, 0));
        assert_eq!(instant_from_angle(375.0, day()), hm(1, 0));
        assert_eq!(instant_from_angle(f64::NAN, day()), hm(0, 0));
    }

    #[test]
    fn rounding_up_to_midnight_stays_on_day() {
        let instant = instant_from_angle(359.9999, day());
        assert_eq!(instant, hm(0, 0));
    }

    fn assert_angle(actual: f64, expected: f64) {
        assert!(
            angular_distance(actual, expected) < 1e-9,
            "expected {expected}°, got {actual}°"
        );
    }

    #[test]
    fn point_angle_orientation() {
        let center = Point::new(100.0, 100.0);
        assert_angle(point_to_angle(Point::new(100.0, 50.0), center), 0.0);
        assert_angle(point_to_angle(Point::new(150.0, 100.0), center), 90.0);
        assert_angle(point_to_angle(Point::new(100.0, 150.0), center), 180.0);
        assert_angle(point_to_angle(Point::new(50.0, 100.0), center), 270.0);
    }

    #[test]
    fn angle_to_point_inverts_point_to_angle() {
        let center = Point::new(200.0, 200.0);
        for angle in [0.0, 37.5, 90.0, 181.0, 300.25, 359.0] {
            let p = angle_to_point(angle, 140.0, center);
            assert_angle(point_to_angle(p, center), angle);
            assert!((p.distance_to(center) - 140.0).abs() < 1e-9);
        }
    }

    #[test]
    fn sweep_crossing_midnight() {
        assert_eq!(sweep_angle(330.0, 30.0), 60.0);
        assert_eq!(sweep_angle(30.0, 330.0), 300.0);
        assert_eq!(sweep_angle(45.0, 45.0), 0.0);
    }

    #[test]
    fn arc_boundaries_are_inclusive() {
        assert!(angle_in_arc(135.0, 135.0, 150.0));
        assert!(angle_in_arc(150.0, 135.0, 150.0));
        assert!(!angle_in_arc(150.1, 135.0, 150.0));
        // wrapped arc
        assert!(angle_in_arc(330.0, 330.0, 30.0));
        assert!(angle_in_arc(0.0, 330.0, 30.0));
        assert!(angle_in_arc(30.0, 330.0, 30.0));
        assert!(!angle_in_arc(180.0, 330.0, 30.0));
    }

    #[test]
    fn sector_hit_test_checks_radius_and_angle() {
        let center = Point::new(0.0, 0.0);
        let sector = RingSector::new(330.0, 30.0, 100.0, 150.0);
        assert!(sector.contains(angle_to_point(0.0, 120.0, center), center));
        assert!(sector.contains(angle_to_point(0.0, 100.0, center), center));
        assert!(!sector.contains(angle_to_point(0.0, 90.0, center), center));
        assert!(!sector.contains(angle_to_point(90.0, 120.0, center), center));
        assert!(sector
            .expanded(20.0)
            .contains(angle_to_point(0.0, 85.0, center), center));
    }

    #[test]
    fn full_day_sector_contains_every_angle() {
        let sector = RingSector::with_sweep(90.0, 360.0, 100.0, 150.0);
        assert!(sector.contains_angle(0.0));
        assert!(sector.contains_angle(89.0));
        assert_eq!(sector.mid_angle(), 270.0);
    }

    #[test]
    fn touch_band_tolerance() {
        let dial = DialGeometry::default();
        assert!(dial.in_touch_band(angle_to_point(10.0, 91.0, dial.center)));
        assert!(dial.in_touch_band(angle_to_point(10.0, 189.0, dial.center)));
        assert!(!dial.in_touch_band(angle_to_point(10.0, 80.0, dial.center)));
        assert!(!dial.in_touch_band(angle_to_point(10.0, 195.0, dial.center)));
    }

    proptest! {
        #[test]
        fn instant_round_trips_through_angle(secs in 0i64..SECONDS_PER_DAY) {
            let t = day().and_time(NaiveTime::MIN) + Duration::seconds(secs);
            prop_assert_eq!(instant_from_angle(angle_from_instant(t), day()), t);
        }

        #[test]
        fn angle_round_trips_through_instant(angle in -720.0f64..720.0) {
            let back = angle_from_instant(instant_from_angle(angle, day()));
            prop_assert!(angular_distance(back, angle) <= 360.0 / SECONDS_PER_DAY as f64);
        }

        #[test]
        fn sweep_is_positive_and_bounded(start in 0.0f64..360.0, end in 0.0f64..360.0) {
            prop_assume!(start != end);
            let sweep = sweep_angle(start, end);
            prop_assert!(sweep > 0.0 && sweep <= 360.0);
        }

        #[test]
        fn normalized_angles_stay_in_range(angle in proptest::num::f64::ANY) {
            let a = normalize_angle(angle);
            prop_assert!((0.0..360.0).contains(&a));
        }
    }
}
