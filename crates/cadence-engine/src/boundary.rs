//! Cached upper bound of a recurring series, used as a storage pre-filter.

use cadence_core::event::ParentEvent;
use cadence_core::rule::RecurrenceRule;
use chrono::{DateTime, Days, Utc};

use crate::clock::{RuleClock, Termination};
use crate::error::{EngineError, EngineResult};

/// ## Summary
/// Computes the instant after which a rule has no further occurrences.
///
/// For `count`/`until` rules this is the last occurrence plus one calendar
/// day, or the anchor itself when the rule produces nothing. `forever` rules
/// have no boundary. The value depends on the rule alone; exceptions moved
/// past it do not widen it.
///
/// ## Errors
/// Returns `Configuration` for an ambiguous terminator or a rule with no
/// terminator at all.
pub fn compute_recurrence_end(
    rule: &RecurrenceRule,
    anchor: DateTime<Utc>,
) -> EngineResult<Option<DateTime<Utc>>> {
    match Termination::of(rule)? {
        Termination::Forever => Ok(None),
        Termination::Open => Err(EngineError::Configuration(format!(
            "{} rule without count, until or forever has no boundary",
            rule.frequency
        ))),
        Termination::Count(_) | Termination::Until(_) => {
            let last = RuleClock::new(rule, anchor).occurrences(None, None)?.last();
            let end = last.map_or(anchor, |last| {
                last.checked_add_days(Days::new(1))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC)
            });
            tracing::debug!(frequency = %rule.frequency, %anchor, ?last, %end, "Computed recurrence end");
            Ok(Some(end))
        }
    }
}

/// ## Summary
/// Recomputes and stores `parent.recurrence_end`.
///
/// Non-recurring parents and `forever` rules are left without a boundary.
///
/// ## Errors
/// Same as [`compute_recurrence_end`]; the parent is not modified on error.
///
/// ## Side Effects
/// Overwrites `parent.recurrence_end`.
pub fn refresh(parent: &mut ParentEvent) -> EngineResult<Option<DateTime<Utc>>> {
    let end = match parent.recurrence.as_ref() {
        Some(rule) => compute_recurrence_end(rule, parent.anchor())?,
        None => None,
    };
    parent.recurrence_end = end;
    Ok(end)
}
