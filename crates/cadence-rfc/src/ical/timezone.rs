//! Timezone resolution and UTC conversion at the ICS boundary.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and timezone canonicalization.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;

use crate::error::{RfcError, RfcResult};

/// Resolver for timezone identifiers, caching every successful lookup.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Resolves a TZID to a `chrono_tz::Tz`.
    ///
    /// Client prefixes are stripped and Windows names or IANA aliases are
    /// mapped to canonical IANA names first.
    ///
    /// ## Errors
    /// Returns `UnknownTimezone` if the TZID cannot be resolved.
    ///
    /// ## Side Effects
    /// Caches successful resolutions.
    pub fn resolve(&mut self, tzid: &str) -> RfcResult<Tz> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        let normalized = normalize_tzid(tzid);
        let tz = Tz::from_str(&normalized)
            .map_err(|_e| RfcError::UnknownTimezone(tzid.to_string()))?;
        tracing::trace!(tzid, %normalized, "Resolved timezone");

        self.cache.insert(tzid.to_string(), tz);
        Ok(tz)
    }
}

/// Maps client-specific TZIDs onto canonical IANA names, or returns them stripped.
fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);

    let windows_parser = WindowsParser::new();
    if let Some(tz) = windows_parser.parse(stripped, None) {
        let iana_parser = IanaParserExtended::new();
        for entry in iana_parser.iter() {
            if entry.time_zone == tz {
                return entry.canonical.to_string();
            }
        }
    }

    // Europe/Kiev -> Europe/Kyiv, US/Eastern -> America/New_York
    let iana_parser = IanaParserExtended::new();
    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    stripped.to_string()
}

/// ## Summary
/// Converts a local time in `tzid` to UTC.
///
/// A local time repeated by a DST fold resolves to its earlier instant.
///
/// ## Errors
/// Returns `UnknownTimezone` for an unresolvable TZID and `NonExistentTime`
/// for a local time skipped by a DST gap.
///
/// ## Side Effects
/// Updates the resolver's cache.
pub fn convert_to_utc(
    local_time: NaiveDateTime,
    tzid: &str,
    resolver: &mut TimeZoneResolver,
) -> RfcResult<DateTime<Utc>> {
    let tz = resolver.resolve(tzid)?;
    match tz.from_local_datetime(&local_time) {
        LocalResult::None => Err(RfcError::NonExistentTime(format!(
            "{local_time} in timezone {tzid}"
        ))),
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _later) => Ok(earlier.with_timezone(&Utc)),
    }
}

/// Midnight UTC of `date`: the instant all-day values are stored at, whatever their zone.
#[must_use]
pub fn all_day_marker(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
