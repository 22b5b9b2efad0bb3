//! `EXDATE` and `RECURRENCE-ID` values for a series' exceptions.

use cadence_core::event::{EventOverrides, Exception, ParentEvent};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::timezone::{TimeZoneResolver, all_day_marker, convert_to_utc};
use crate::error::{RfcError, RfcResult};

const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";

/// ## Summary
/// Formats an instant as an ICS date-time value.
///
/// All-day values are written as a bare date.
#[must_use]
pub fn format_date_time(ts: DateTime<Utc>, all_day: bool) -> String {
    if all_day {
        ts.format(DATE_FORMAT).to_string()
    } else {
        ts.format(UTC_FORMAT).to_string()
    }
}

/// ## Summary
/// Parses an ICS date-time value into UTC.
///
/// Values ending in `Z` are UTC. Local values use `tzid` when given and are
/// read as UTC otherwise. Bare dates become all-day markers.
///
/// ## Errors
/// Returns `ParseError` for malformed values and the conversion errors of
/// [`convert_to_utc`].
pub fn parse_date_time(
    value: &str,
    tzid: Option<&str>,
    resolver: &mut TimeZoneResolver,
) -> RfcResult<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(utc) = NaiveDateTime::parse_from_str(value, UTC_FORMAT) {
        return Ok(utc.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(all_day_marker(date));
    }
    let local = NaiveDateTime::parse_from_str(value, LOCAL_FORMAT)
        .map_err(|err| RfcError::ParseError(format!("date-time {value}: {err}")))?;
    match tzid {
        Some(tzid) => convert_to_utc(local, tzid, resolver),
        None => Ok(local.and_utc()),
    }
}

/// Slots removed from the series, in ascending order.
#[must_use]
pub fn exdates(parent: &ParentEvent) -> Vec<DateTime<Utc>> {
    let mut dates: Vec<_> = parent
        .exceptions
        .iter()
        .filter(|exception| exception.deleted)
        .map(Exception::rec_id)
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// ## Summary
/// Formats the `EXDATE` property value of a series, if it has deletions.
#[must_use]
pub fn format_exdate(parent: &ParentEvent) -> Option<String> {
    let dates = exdates(parent);
    if dates.is_empty() {
        return None;
    }
    Some(
        dates
            .into_iter()
            .map(|ts| format_date_time(ts, parent.details.all_day))
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// ## Summary
/// Turns imported `EXDATE` values into deletion exceptions.
///
/// A value already covered by an earlier one is skipped.
#[must_use]
pub fn exceptions_from_exdates(dates: impl IntoIterator<Item = DateTime<Utc>>) -> Vec<Exception> {
    let mut seen = std::collections::BTreeSet::new();
    dates
        .into_iter()
        .filter(|ts| seen.insert(*ts))
        .map(Exception::deletion)
        .collect()
}

/// ## Summary
/// `RECURRENCE-ID` values of the series' live exceptions, paired with them.
///
/// Each is written in the parent's all-day form, in ascending slot order.
#[must_use]
pub fn recurrence_ids(parent: &ParentEvent) -> Vec<(String, &Exception)> {
    let mut live: Vec<_> = parent
        .exceptions
        .iter()
        .filter(|exception| !exception.deleted)
        .collect();
    live.sort_by_key(|exception| exception.rec_id());
    live.into_iter()
        .map(|exception| {
            (
                format_date_time(exception.rec_id(), parent.details.all_day),
                exception,
            )
        })
        .collect()
}

/// ## Summary
/// Builds the exception for an imported override component.
///
/// ## Errors
/// Returns the errors of [`parse_date_time`] for the `RECURRENCE-ID` value.
pub fn exception_from_recurrence_id(
    recurrence_id: &str,
    tzid: Option<&str>,
    overrides: EventOverrides,
    resolver: &mut TimeZoneResolver,
) -> RfcResult<Exception> {
    let rec_id = parse_date_time(recurrence_id, tzid, resolver)?;
    tracing::trace!(%rec_id, "Imported RECURRENCE-ID");
    Ok(Exception::new(rec_id, overrides))
}
