//! iCalendar value mapping.

pub mod exdate;
pub mod recur;
pub mod timezone;

pub use exdate::{exceptions_from_exdates, exdates, recurrence_ids};
pub use recur::{build_rrule_set, format_rrule, parse_rrule};
pub use timezone::{TimeZoneResolver, convert_to_utc};
