//! Exception edits applied to an in-memory parent event.
//!
//! The caller persists the modified parent; nothing here touches storage.

use cadence_core::event::{EventOverrides, Exception, ParentEvent};
use cadence_core::rule::RecurrenceRule;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::boundary::compute_recurrence_end;
use crate::clock::Termination;
use crate::error::{EngineError, EngineResult};
use crate::materialize::generates;

/// Occurrence addressed by an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// An occurrence already promoted to an exception.
    Exception(Uuid),
    /// An occurrence identified by its original slot.
    Slot(DateTime<Utc>),
}

/// Looks up an exception by its promoted identity.
#[must_use]
pub fn find_exception(parent: &ParentEvent, id: Uuid) -> Option<&Exception> {
    parent.exceptions.iter().find(|exception| exception.id() == id)
}

/// ## Summary
/// Promotes the occurrence at `rec_id` to an exception carrying `overrides`.
///
/// Overrides equal to the inherited values are dropped. If the slot already
/// has an exception, the overrides are merged into it instead.
///
/// ## Errors
/// Returns `NotFound` if the parent does not recur, its rule never
/// produces `rec_id`, or the occurrence has been deleted. Propagates rule
/// expansion errors.
///
/// ## Side Effects
/// Adds or modifies an entry of `parent.exceptions`.
pub fn create_exception(
    parent: &mut ParentEvent,
    rec_id: DateTime<Utc>,
    overrides: EventOverrides,
) -> EngineResult<Uuid> {
    if let Some((id, deleted)) =
        slot_exception_mut(parent, rec_id).map(|existing| (existing.id(), existing.deleted))
    {
        if deleted {
            return Err(EngineError::NotFound(format!(
                "occurrence {rec_id} of event {} is deleted",
                parent.id
            )));
        }
        tracing::debug!(sid = %parent.id, %rec_id, exception_id = %id, "Merging into existing exception");
        return update_exception(parent, id, overrides).map(|()| id);
    }

    ensure_generated(parent, rec_id)?;
    let mut exception = Exception::new(rec_id, overrides);
    exception.overrides.elide_inherited(&parent.details, rec_id);
    let id = exception.id();
    tracing::debug!(
        sid = %parent.id,
        %rec_id,
        exception_id = %id,
        overridden = !exception.overrides.is_empty(),
        "Created exception"
    );
    parent.exceptions.push(exception);
    Ok(id)
}

/// ## Summary
/// Applies `patch` over a stored exception's overrides.
///
/// Inherited values are elided again afterwards, and the boundary of a
/// bounded rule is recomputed.
///
/// ## Errors
/// Returns `NotFound` for an unknown exception id, and `Configuration` if
/// the bounded rule cannot be indexed. The parent is left unchanged on error.
///
/// ## Side Effects
/// Modifies the exception and possibly `parent.recurrence_end`.
pub fn update_exception(
    parent: &mut ParentEvent,
    id: Uuid,
    patch: EventOverrides,
) -> EngineResult<()> {
    let index = parent
        .exceptions
        .iter()
        .position(|exception| exception.id() == id)
        .ok_or_else(|| EngineError::NotFound(format!("exception {id}")))?;
    let end = match parent.recurrence.as_ref() {
        Some(rule) if rule.is_bounded() => Some(compute_recurrence_end(rule, parent.anchor())?),
        _ => None,
    };

    let details = parent.details.clone();
    let exception = &mut parent.exceptions[index];
    exception.overrides.merge(patch);
    exception.overrides.elide_inherited(&details, exception.rec_id());
    if let Some(end) = end {
        parent.recurrence_end = end;
    }
    tracing::debug!(sid = %parent.id, exception_id = %id, ?end, "Updated exception");
    Ok(())
}

/// ## Summary
/// Deletes one occurrence of the series.
///
/// An existing exception is marked deleted; an unedited slot gets a new
/// deletion exception. Returns the identity of the deletion.
///
/// ## Errors
/// Returns `NotFound` for an unknown exception id, or a slot the rule never
/// produces.
///
/// ## Side Effects
/// Adds or modifies an entry of `parent.exceptions`.
pub fn delete_occurrence(parent: &mut ParentEvent, target: EditTarget) -> EngineResult<Uuid> {
    let existing = match target {
        EditTarget::Exception(id) => Some(
            parent
                .exceptions
                .iter_mut()
                .find(|exception| exception.id() == id)
                .ok_or_else(|| EngineError::NotFound(format!("exception {id}")))?,
        ),
        EditTarget::Slot(rec_id) => slot_exception_mut(parent, rec_id),
    };

    if let Some(exception) = existing {
        exception.deleted = true;
        let id = exception.id();
        tracing::debug!(sid = %parent.id, exception_id = %id, "Marked exception deleted");
        return Ok(id);
    }

    let EditTarget::Slot(rec_id) = target else {
        return Err(EngineError::NotFound(format!("{target:?}")));
    };
    ensure_generated(parent, rec_id)?;
    let deletion = Exception::deletion(rec_id);
    let id = deletion.id();
    tracing::debug!(sid = %parent.id, %rec_id, exception_id = %id, "Deleted occurrence");
    parent.exceptions.push(deletion);
    Ok(id)
}

/// ## Summary
/// Replaces the parent's rule and recomputes its boundary.
///
/// Existing exceptions are kept; those whose slot the new rule no longer
/// produces still show when their effective start is queried.
///
/// ## Errors
/// Returns `Configuration` for an ambiguous or missing terminator; the parent
/// is left unchanged.
///
/// ## Side Effects
/// Overwrites `parent.recurrence` and `parent.recurrence_end`.
pub fn replace_rule(
    parent: &mut ParentEvent,
    rule: Option<RecurrenceRule>,
) -> EngineResult<Option<DateTime<Utc>>> {
    let end = match rule.as_ref() {
        Some(rule) => {
            rule.validate()?;
            Termination::of(rule)?;
            compute_recurrence_end(rule, parent.anchor())?
        }
        None => None,
    };
    tracing::debug!(sid = %parent.id, recurring = rule.is_some(), ?end, "Replaced rule");
    parent.recurrence = rule;
    parent.recurrence_end = end;
    Ok(end)
}

/// Last exception holding `rec_id`, the one the overlay honors.
fn slot_exception_mut(parent: &mut ParentEvent, rec_id: DateTime<Utc>) -> Option<&mut Exception> {
    parent
        .exceptions
        .iter_mut()
        .rev()
        .find(|exception| exception.rec_id() == rec_id)
}

fn ensure_generated(parent: &ParentEvent, rec_id: DateTime<Utc>) -> EngineResult<()> {
    let Some(rule) = parent.recurrence.as_ref() else {
        return Err(EngineError::NotFound(format!(
            "event {} does not recur",
            parent.id
        )));
    };
    if generates(rule, parent.anchor(), rec_id)? {
        Ok(())
    } else {
        Err(EngineError::NotFound(format!(
            "event {} has no occurrence at {rec_id}",
            parent.id
        )))
    }
}
