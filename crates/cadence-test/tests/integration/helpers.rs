#![allow(clippy::expect_used, clippy::unwrap_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides the shared fixtures of the scenario suite: the weekday study
//! series, timestamp shorthands and projections over materialized output.

use cadence_test::component::event::{EventDetails, ParentEvent, VirtualInstance};
use cadence_test::component::rule::RecurrenceRule;
use cadence_test::component::types::{DayToken, Frequency};
use cadence_test::component::window::Window;
use chrono::{DateTime, TimeZone, Utc};

pub use tracing;

/// UTC timestamp shorthand.
pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// June 2017 shorthand used by the scenario suite.
pub fn june(d: u32, h: u32, min: u32) -> DateTime<Utc> {
    at(2017, 6, d, h, min)
}

pub fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> Window {
    Window::new(start, end).expect("valid window")
}

/// Weekly Monday-to-Friday rule ending 2017-07-31.
pub fn weekdays_rule() -> RecurrenceRule {
    RecurrenceRule::new(Frequency::Weekly)
        .with_by_day([
            DayToken::MO,
            DayToken::TU,
            DayToken::WE,
            DayToken::TH,
            DayToken::FR,
        ])
        .with_until(at(2017, 7, 31, 0, 0))
}

/// Evening study series starting Thursday 2017-06-01 19:00, two hours long.
pub fn study_series() -> ParentEvent {
    ParentEvent::new(
        EventDetails::new("Study group", june(1, 19, 0))
            .with_end(june(1, 21, 0))
            .with_location("Library")
            .with_labels(["library", "study"]),
    )
    .with_recurrence(weekdays_rule())
}

pub fn starts(instances: &[VirtualInstance]) -> Vec<DateTime<Utc>> {
    instances.iter().map(VirtualInstance::start).collect()
}
