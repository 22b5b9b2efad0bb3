//! `RRULE` text for recurrence rules.
//!
//! Export emits only the parts the engine honors for the rule's frequency,
//! so the text expands to the same occurrences under RFC 5545 semantics.
//! `BYYEARDAY` is never exported: RFC 5545 forbids it for monthly, weekly
//! and daily rules, and yearly rules ignore it.

use std::str::FromStr;

use cadence_core::rule::RecurrenceRule;
use cadence_core::types::{DayToken, Frequency};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rrule::{RRule, RRuleSet, Tz, Unvalidated};

use crate::error::{RfcError, RfcResult};

const UNTIL_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const FLOATING_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";

/// ## Summary
/// Formats a rule as the value of an `RRULE` property.
///
/// `COUNT` or `UNTIL` is written when set; a `forever` rule carries neither.
#[must_use]
pub fn format_rrule(rule: &RecurrenceRule) -> String {
    let mut out = format!("FREQ={};INTERVAL={}", rule.frequency, rule.interval);
    if let Some(until) = rule.until {
        out.push_str(&format!(";UNTIL={}", until.format(UNTIL_FORMAT)));
    } else if let Some(count) = rule.count {
        out.push_str(&format!(";COUNT={count}"));
    }

    let by_day = !rule.by_day.is_empty();
    let by_month = !rule.by_month.is_empty();
    let by_month_day = !rule.by_month_day.is_empty();
    match rule.frequency {
        Frequency::Yearly => {}
        Frequency::Monthly => {
            if by_day {
                push_list(&mut out, "BYDAY", &rule.by_day);
            } else if by_month_day {
                push_list(&mut out, "BYMONTHDAY", &rule.by_month_day);
            }
            if by_month {
                push_list(&mut out, "BYMONTH", &rule.by_month);
            }
        }
        Frequency::Weekly => {
            if by_day {
                push_list(&mut out, "BYDAY", &rule.by_day);
            }
            if by_month {
                push_list(&mut out, "BYMONTH", &rule.by_month);
            }
        }
        Frequency::Daily => {
            if by_day {
                push_list(&mut out, "BYDAY", &rule.by_day);
            }
            if by_month {
                push_list(&mut out, "BYMONTH", &rule.by_month);
            }
            if by_month_day {
                push_list(&mut out, "BYMONTHDAY", &rule.by_month_day);
            }
        }
    }
    out
}

fn push_list<T: std::fmt::Display>(
    out: &mut String,
    name: &str,
    values: impl IntoIterator<Item = T>,
) {
    let joined = values
        .into_iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&format!(";{name}={joined}"));
}

/// ## Summary
/// Parses `RRULE` text, with or without the `RRULE:` prefix, into a rule.
///
/// The text is first checked by the `rrule` crate's parser. A rule without
/// `COUNT` or `UNTIL` is read as never ending.
///
/// ## Errors
/// Returns `ParseError` for malformed text, `Unsupported` for frequencies
/// finer than daily and for parts the engine does not implement (ordinal
/// `BYDAY`, `BYSETPOS`, `BYWEEKNO`, time-of-day parts, `WKST` other than
/// Monday), and `CoreError` for out-of-range values.
pub fn parse_rrule(text: &str) -> RfcResult<RecurrenceRule> {
    let body = text.trim();
    let body = body.strip_prefix("RRULE:").unwrap_or(body);
    body.parse::<RRule<Unvalidated>>()
        .map_err(|err| RfcError::ParseError(err.to_string()))?;

    let mut frequency = None;
    let mut parts = Vec::new();
    for part in body.split(';').filter(|part| !part.is_empty()) {
        let (name, value) = part
            .split_once('=')
            .ok_or_else(|| RfcError::ParseError(format!("RRULE part without value: {part}")))?;
        let name = name.to_ascii_uppercase();
        if name == "FREQ" {
            frequency = Some(
                Frequency::parse(value)
                    .ok_or_else(|| RfcError::Unsupported(format!("FREQ={value}")))?,
            );
        } else {
            parts.push((name, value));
        }
    }
    let frequency = frequency.ok_or_else(|| RfcError::ParseError("RRULE without FREQ".into()))?;

    let mut rule = RecurrenceRule::new(frequency);
    for (name, value) in parts {
        rule = match name.as_str() {
            "INTERVAL" => rule.with_interval(parse_number(&name, value)?)?,
            "COUNT" => rule.with_count(parse_number(&name, value)?)?,
            "UNTIL" => rule.with_until(parse_until(value)?),
            "BYDAY" => rule.with_by_day(parse_by_day(value)?),
            "BYMONTHDAY" => rule.with_by_month_day(parse_numbers(&name, value)?)?,
            "BYMONTH" => rule.with_by_month(parse_numbers(&name, value)?)?,
            "BYYEARDAY" => rule.with_by_year_day(parse_numbers(&name, value)?)?,
            "WKST" if value.eq_ignore_ascii_case("MO") => rule,
            _ => return Err(RfcError::Unsupported(format!("{name}={value}"))),
        };
    }

    if !rule.is_bounded() {
        rule = rule.with_forever();
    }
    tracing::trace!(rrule = %body, ?rule, "Parsed RRULE");
    Ok(rule)
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> RfcResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_e| RfcError::ParseError(format!("{name}={value} is not a valid number")))
}

fn parse_numbers<T: FromStr>(name: &str, value: &str) -> RfcResult<Vec<T>> {
    value
        .split(',')
        .map(|item| parse_number(name, item))
        .collect()
}

fn parse_by_day(value: &str) -> RfcResult<Vec<DayToken>> {
    value
        .split(',')
        .map(|item| {
            DayToken::parse(item.trim())
                .ok_or_else(|| RfcError::Unsupported(format!("BYDAY={item}")))
        })
        .collect()
}

/// ## Summary
/// Parses an `UNTIL` value in UTC, floating or date-only form.
///
/// Floating times are read as UTC; a date means midnight UTC of that day.
///
/// ## Errors
/// Returns `ParseError` if none of the forms match.
pub fn parse_until(value: &str) -> RfcResult<DateTime<Utc>> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, UNTIL_FORMAT)
        .or_else(|_e| NaiveDateTime::parse_from_str(value, FLOATING_FORMAT))
        .or_else(|_e| {
            NaiveDate::parse_from_str(value, DATE_FORMAT).map(|date| date.and_time(NaiveTime::MIN))
        })
        .map(|naive| naive.and_utc())
        .map_err(|err| RfcError::ParseError(format!("UNTIL={value}: {err}")))
}

/// ## Summary
/// Builds a validated `rrule` set for `rule` starting at `anchor`.
///
/// ## Errors
/// Returns `ParseError` or `ValidationError` if the `rrule` crate rejects
/// the exported text.
pub fn build_rrule_set(rule: &RecurrenceRule, anchor: DateTime<Utc>) -> RfcResult<RRuleSet> {
    let text = format_rrule(rule);
    let rrule = text
        .parse::<RRule<Unvalidated>>()
        .map_err(|err| RfcError::ParseError(err.to_string()))?;
    rrule
        .build(anchor.with_timezone(&Tz::UTC))
        .map_err(|err| RfcError::ValidationError(err.to_string()))
}
