//! Coarse storage-side filter on parent events, evaluated in memory.

use cadence_core::event::ParentEvent;
use cadence_core::window::Window;

/// ## Summary
/// Returns true if `parent` may have an instance in `window`.
///
/// A recurring parent passes when it starts no later than the window end
/// and its cached `recurrence_end`, if any, is no earlier than the window
/// start. A single event passes when it intersects the window. False
/// positives are expected and resolved by materialization.
#[must_use]
pub fn may_intersect(parent: &ParentEvent, window: &Window) -> bool {
    if parent.is_recurring() {
        parent.anchor() <= window.end()
            && parent
                .recurrence_end
                .is_none_or(|end| end >= window.start())
    } else {
        window.overlaps(parent.details.start, parent.details.end)
    }
}

/// Parents that pass [`may_intersect`], in input order.
pub fn select_candidates<'a>(
    events: &'a [ParentEvent],
    window: &'a Window,
) -> impl Iterator<Item = &'a ParentEvent> {
    events
        .iter()
        .filter(move |parent| may_intersect(parent, window))
}
