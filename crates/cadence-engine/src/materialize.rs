//! Windowed materialization of parent events into virtual instances.

use cadence_core::event::{InstanceIdentity, ParentEvent, VirtualInstance};
use cadence_core::rule::RecurrenceRule;
use cadence_core::window::Window;
use chrono::{DateTime, TimeDelta, Utc};

use crate::clock::RuleClock;
use crate::error::EngineResult;
use crate::overlay::OverlayMerger;
use crate::prefilter::select_candidates;

/// ## Summary
/// Produces every instance of `parent` visible in `window`, ordered by start.
///
/// A parent without a rule yields itself if it intersects the window.
/// Otherwise the rule is expanded over the window and the parent's
/// exceptions are merged over the result.
///
/// ## Errors
/// Propagates `Configuration` and validation errors from rule expansion.
pub fn materialize(parent: &ParentEvent, window: &Window) -> EngineResult<Vec<VirtualInstance>> {
    let Some(clock) = RuleClock::for_event(parent) else {
        let visible = window.overlaps(parent.details.start, parent.details.end);
        tracing::trace!(sid = %parent.id, %window, visible, "Non-recurring event");
        return Ok(if visible {
            vec![standalone(parent)]
        } else {
            Vec::new()
        });
    };

    let occurrences = clock.generate(Some(window.start()), Some(window.end()))?;
    Ok(OverlayMerger::for_event(parent).merge(occurrences, window))
}

/// ## Summary
/// Materializes every parent that passes the pre-filter, ordered by start.
///
/// ## Errors
/// Fails on the first parent whose rule cannot be expanded.
pub fn materialize_all(
    events: &[ParentEvent],
    window: &Window,
) -> EngineResult<Vec<VirtualInstance>> {
    let mut instances = Vec::new();
    for parent in select_candidates(events, window) {
        instances.extend(materialize(parent, window)?);
    }
    instances.sort_by_key(VirtualInstance::start);
    tracing::debug!(
        events = events.len(),
        instances = instances.len(),
        %window,
        "Materialized events"
    );
    Ok(instances)
}

/// ## Summary
/// Produces the single instance whose original slot is `rec_id`.
///
/// A stored exception for the slot yields its promoted instance, or nothing
/// if it is deleted. An unedited slot yields a preview if the rule generates
/// it. A non-recurring parent yields itself when `rec_id` is its start.
///
/// ## Errors
/// Propagates `Configuration` and validation errors from rule expansion.
pub fn materialize_one(
    parent: &ParentEvent,
    rec_id: DateTime<Utc>,
) -> EngineResult<Option<VirtualInstance>> {
    let Some(rule) = parent.recurrence.as_ref() else {
        return Ok((parent.details.start == rec_id).then(|| standalone(parent)));
    };

    let merger = OverlayMerger::for_event(parent);
    if let Some(exception) = merger.store().lookup_by_rec_id(rec_id) {
        if exception.deleted {
            tracing::debug!(sid = %parent.id, %rec_id, "Occurrence is deleted");
            return Ok(None);
        }
        return Ok(Some(merger.promoted(exception)));
    }

    if generates(rule, parent.anchor(), rec_id)? {
        Ok(Some(merger.preview(rec_id)))
    } else {
        tracing::debug!(sid = %parent.id, %rec_id, "No occurrence at requested slot");
        Ok(None)
    }
}

/// Returns true if the rule anchored at `anchor` has an occurrence at `ts`.
pub(crate) fn generates(
    rule: &RecurrenceRule,
    anchor: DateTime<Utc>,
    ts: DateTime<Utc>,
) -> EngineResult<bool> {
    let Some(end) = ts.checked_add_signed(TimeDelta::seconds(1)) else {
        return Ok(false);
    };
    Ok(RuleClock::new(rule, anchor)
        .occurrences(Some(ts), Some(end))?
        .next()
        == Some(ts))
}

fn standalone(parent: &ParentEvent) -> VirtualInstance {
    VirtualInstance {
        sid: parent.id,
        identity: InstanceIdentity::Standalone,
        details: parent.details.clone(),
    }
}
