//! Applies stored exceptions over generated occurrences.

use std::collections::HashSet;

use cadence_core::event::{Exception, InstanceIdentity, ParentEvent, VirtualInstance};
use cadence_core::window::Window;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::exceptions::ExceptionStore;

/// Merges a parent's rule occurrences with its exception snapshot.
#[derive(Debug, Clone)]
pub struct OverlayMerger<'a> {
    parent: &'a ParentEvent,
    store: ExceptionStore<'a>,
}

impl<'a> OverlayMerger<'a> {
    #[must_use]
    pub const fn new(parent: &'a ParentEvent, store: ExceptionStore<'a>) -> Self {
        Self { parent, store }
    }

    /// Merger over the parent's own exception list.
    #[must_use]
    pub fn for_event(parent: &'a ParentEvent) -> Self {
        Self::new(parent, ExceptionStore::new(&parent.exceptions))
    }

    #[must_use]
    pub const fn store(&self) -> &ExceptionStore<'a> {
        &self.store
    }

    /// ## Summary
    /// Resolves the instances visible in `window`.
    ///
    /// Each in-window occurrence is dropped if a deleted exception holds its
    /// slot, replaced by the promoted exception if a live one does, and
    /// otherwise filled from the parent. A promoted exception is only shown
    /// when its effective start lies in the window. Live exceptions whose
    /// effective start is in the window but whose slot was not generated are
    /// then added. Output is ordered by start, ties broken by identity.
    #[must_use]
    pub fn merge<I>(&self, occurrences: I, window: &Window) -> Vec<VirtualInstance>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut instances = Vec::new();
        let mut promoted: HashSet<Uuid> = HashSet::new();
        let mut suppressed = 0_usize;

        for ts in occurrences.into_iter().filter(|ts| window.contains(*ts)) {
            match self.store.lookup_by_rec_id(ts) {
                Some(exception) if exception.deleted => {
                    tracing::trace!(rec_id = %ts, "Occurrence deleted by exception");
                    suppressed += 1;
                }
                Some(exception) => {
                    promoted.insert(exception.id());
                    if window.contains(exception.effective_start()) {
                        instances.push(self.promoted(exception));
                    } else {
                        tracing::trace!(
                            rec_id = %ts,
                            start = %exception.effective_start(),
                            "Occurrence moved out of window"
                        );
                    }
                }
                None => instances.push(self.occurrence(ts)),
            }
        }

        for exception in self.store.all_in_window(window) {
            if promoted.insert(exception.id()) {
                tracing::trace!(
                    rec_id = %exception.rec_id(),
                    start = %exception.effective_start(),
                    "Exception moved into window"
                );
                instances.push(self.promoted(exception));
            }
        }

        instances.sort_by(|a, b| {
            a.start()
                .cmp(&b.start())
                .then_with(|| a.identity.cmp(&b.identity))
        });

        tracing::debug!(
            sid = %self.parent.id,
            %window,
            instances = instances.len(),
            promoted = promoted.len(),
            suppressed,
            "Merged exceptions over occurrences"
        );
        instances
    }

    /// ## Summary
    /// Synthesizes the unedited occurrence at `rec_id`, ahead of its first edit.
    ///
    /// Deletion status is not consulted.
    #[must_use]
    pub fn preview(&self, rec_id: DateTime<Utc>) -> VirtualInstance {
        VirtualInstance {
            sid: self.parent.id,
            identity: InstanceIdentity::Preview { rec_id },
            details: self.parent.details.at_slot(rec_id),
        }
    }

    /// Instance backed by a stored exception, unset fields filled from the parent.
    #[must_use]
    pub fn promoted(&self, exception: &Exception) -> VirtualInstance {
        VirtualInstance {
            sid: self.parent.id,
            identity: InstanceIdentity::Promoted {
                id: exception.id(),
                rec_id: exception.rec_id(),
            },
            details: exception
                .overrides
                .resolve(&self.parent.details, exception.rec_id()),
        }
    }

    fn occurrence(&self, ts: DateTime<Utc>) -> VirtualInstance {
        VirtualInstance {
            sid: self.parent.id,
            identity: InstanceIdentity::Occurrence,
            details: self.parent.details.at_slot(ts),
        }
    }
}
