//! RFC 5545 boundary for the recurrence engine.
//!
//! Maps recurrence rules to and from `RRULE` text, exceptions to and from
//! `EXDATE`/`RECURRENCE-ID` values, and zoned local times into UTC.

pub mod error;
pub mod ical;
