//! Read-only index over a parent event's stored exceptions.

use std::collections::HashMap;

use cadence_core::event::Exception;
use cadence_core::window::Window;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A point-in-time view of one parent's exceptions, indexed by `rec_id` and identity.
#[derive(Debug, Clone)]
pub struct ExceptionStore<'a> {
    exceptions: &'a [Exception],
    by_rec_id: HashMap<DateTime<Utc>, usize>,
    by_id: HashMap<Uuid, usize>,
}

impl<'a> ExceptionStore<'a> {
    /// ## Summary
    /// Indexes a snapshot of exceptions.
    ///
    /// When two exceptions share a `rec_id`, the later one in the snapshot wins.
    #[must_use]
    pub fn new(exceptions: &'a [Exception]) -> Self {
        let mut by_rec_id = HashMap::with_capacity(exceptions.len());
        let mut by_id = HashMap::with_capacity(exceptions.len());
        for (index, exception) in exceptions.iter().enumerate() {
            if let Some(previous) = by_rec_id.insert(exception.rec_id(), index) {
                tracing::warn!(
                    rec_id = %exception.rec_id(),
                    replaced = %exceptions[previous].id(),
                    kept = %exception.id(),
                    "Duplicate exception for one occurrence, keeping the later one"
                );
            }
            by_id.insert(exception.id(), index);
        }
        Self {
            exceptions,
            by_rec_id,
            by_id,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exceptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exceptions.is_empty()
    }

    /// Exception overriding the occurrence originally at `rec_id`, deleted or not.
    #[must_use]
    pub fn lookup_by_rec_id(&self, rec_id: DateTime<Utc>) -> Option<&'a Exception> {
        self.by_rec_id.get(&rec_id).map(|index| &self.exceptions[*index])
    }

    /// Exception with the given promoted identity.
    #[must_use]
    pub fn lookup_by_id(&self, id: Uuid) -> Option<&'a Exception> {
        self.by_id.get(&id).map(|index| &self.exceptions[*index])
    }

    /// ## Summary
    /// Non-deleted exceptions whose effective start lies in `window`.
    ///
    /// Only the exception that owns its `rec_id` in the index is returned, so a
    /// shadowed duplicate never resurfaces.
    pub fn all_in_window(&self, window: &Window) -> impl Iterator<Item = &'a Exception> {
        self.live()
            .filter(|exception| !exception.deleted)
            .filter(move |exception| window.contains(exception.effective_start()))
    }

    /// Deleted exceptions whose `rec_id` (the slot they suppress) lies in `window`.
    pub fn all_deleted_in_window(
        &self,
        window: &Window,
    ) -> impl Iterator<Item = &'a Exception> {
        self.live()
            .filter(|exception| exception.deleted)
            .filter(move |exception| window.contains(exception.rec_id()))
    }

    fn live(&self) -> impl Iterator<Item = &'a Exception> {
        let exceptions = self.exceptions;
        exceptions
            .iter()
            .enumerate()
            .filter(move |(index, exception)| {
                self.by_rec_id.get(&exception.rec_id()) == Some(index)
            })
            .map(|(_, exception)| exception)
    }
}
