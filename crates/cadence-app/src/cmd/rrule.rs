//! `cadence rrule`: ICS text of a series, or a rule parsed from `RRULE` text.

use std::path::PathBuf;

use cadence_core::event::ParentEvent;
use cadence_rfc::ical::exdate::{format_exdate, recurrence_ids};
use cadence_rfc::ical::{format_rrule, parse_rrule};
use clap::Args;

use crate::input::read_event;

#[derive(Args, Debug)]
pub struct RruleArgs {
    /// Parent event JSON document (`-` for stdin)
    #[arg(required_unless_present = "parse")]
    pub event: Option<PathBuf>,

    /// Parse this RRULE text and print the rule as JSON instead
    #[arg(long, conflicts_with = "event")]
    pub parse: Option<String>,
}

/// ## Summary
/// Prints the `RRULE`, `EXDATE` and `RECURRENCE-ID` lines of a series, or
/// the JSON form of a parsed rule.
///
/// ## Errors
/// Returns input errors, an error for a non-recurring event, and RRULE
/// parse errors.
pub fn run_rrule(args: &RruleArgs) -> anyhow::Result<String> {
    if let Some(text) = args.parse.as_deref() {
        return Ok(serde_json::to_string_pretty(&parse_rrule(text)?)?);
    }
    let Some(path) = args.event.as_deref() else {
        anyhow::bail!("an event document or --parse is required");
    };
    ics_lines(&read_event(path)?)
}

/// ## Summary
/// Renders the recurrence properties of `parent`, one per line.
///
/// ## Errors
/// Returns an error if the event does not recur.
pub fn ics_lines(parent: &ParentEvent) -> anyhow::Result<String> {
    let Some(rule) = parent.recurrence.as_ref() else {
        anyhow::bail!("event {} does not recur", parent.id);
    };
    let mut lines = vec![format!("RRULE:{}", format_rrule(rule))];
    if let Some(exdate) = format_exdate(parent) {
        lines.push(format!("EXDATE:{exdate}"));
    }
    lines.extend(
        recurrence_ids(parent)
            .into_iter()
            .map(|(recurrence_id, _)| format!("RECURRENCE-ID:{recurrence_id}")),
    );
    Ok(lines.join("\n"))
}
