//! Parent events, their sparse exceptions and materialized instances.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::UNLABELED;
use crate::rule::RecurrenceRule;

/// Display fields of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub all_day: bool,
}

impl EventDetails {
    #[must_use]
    pub fn new(title: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            location: None,
            description: None,
            start,
            end: None,
            labels: Vec::new(),
            url: None,
            email: None,
            all_day: false,
        }
    }

    #[must_use]
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Length of the event, if it has an end.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        self.end.map(|end| end.signed_duration_since(self.start))
    }

    /// ## Summary
    /// Returns these details moved so that they start at `slot`.
    ///
    /// The end moves with the start, preserving the duration.
    #[must_use]
    pub fn at_slot(&self, slot: DateTime<Utc>) -> Self {
        Self {
            start: slot,
            end: self.duration().map(|duration| slot + duration),
            ..self.clone()
        }
    }
}

/// Midnight UTC of the day containing `ts`; the marker used for all-day events.
#[must_use]
pub fn all_day_marker(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Fields an exception overrides. `None` means "inherit from the parent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
}

fn drop_if_inherited<T: PartialEq>(field: &mut Option<T>, inherited: Option<&T>) {
    if field.is_some() && field.as_ref() == inherited {
        *field = None;
    }
}

impl EventOverrides {
    /// Returns true if nothing is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copies every field set in `patch` over this one.
    pub fn merge(&mut self, patch: Self) {
        let Self {
            title,
            location,
            description,
            start,
            end,
            labels,
            url,
            email,
            all_day,
        } = patch;
        self.title = title.or(self.title.take());
        self.location = location.or(self.location.take());
        self.description = description.or(self.description.take());
        self.start = start.or(self.start.take());
        self.end = end.or(self.end.take());
        self.labels = labels.or(self.labels.take());
        self.url = url.or(self.url.take());
        self.email = email.or(self.email.take());
        self.all_day = all_day.or(self.all_day.take());
    }

    /// ## Summary
    /// Drops every override equal to the value the occurrence would inherit.
    ///
    /// The inherited start of the occurrence at `rec_id` is `rec_id` itself and
    /// the inherited end follows the (possibly overridden) start by the
    /// parent's duration. Every other field inherits the parent's value.
    pub fn elide_inherited(&mut self, parent: &EventDetails, rec_id: DateTime<Utc>) {
        drop_if_inherited(&mut self.start, Some(&rec_id));
        let slot = parent.at_slot(self.start.unwrap_or(rec_id));
        drop_if_inherited(&mut self.end, slot.end.as_ref());
        drop_if_inherited(&mut self.title, Some(&slot.title));
        drop_if_inherited(&mut self.location, slot.location.as_ref());
        drop_if_inherited(&mut self.description, slot.description.as_ref());
        drop_if_inherited(&mut self.labels, Some(&slot.labels));
        drop_if_inherited(&mut self.url, slot.url.as_ref());
        drop_if_inherited(&mut self.email, slot.email.as_ref());
        drop_if_inherited(&mut self.all_day, Some(&slot.all_day));
    }

    /// ## Summary
    /// Resolves the full details of the occurrence originally at `rec_id`.
    ///
    /// Unset fields are filled from the parent, with the start and end
    /// following the inherited slot rules of [`Self::elide_inherited`].
    #[must_use]
    pub fn resolve(&self, parent: &EventDetails, rec_id: DateTime<Utc>) -> EventDetails {
        let slot = parent.at_slot(self.start.unwrap_or(rec_id));
        EventDetails {
            title: self.title.clone().unwrap_or(slot.title),
            location: self.location.clone().or(slot.location),
            description: self.description.clone().or(slot.description),
            start: slot.start,
            end: self.end.or(slot.end),
            labels: self.labels.clone().unwrap_or(slot.labels),
            url: self.url.clone().or(slot.url),
            email: self.email.clone().or(slot.email),
            all_day: self.all_day.unwrap_or(slot.all_day),
        }
    }
}

/// A stored override or deletion of one occurrence of a recurring series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    /// Stable identity; stored documents must carry it so repeated loads agree.
    id: Uuid,
    rec_id: DateTime<Utc>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ics_uid: Option<String>,
    #[serde(flatten)]
    pub overrides: EventOverrides,
}

impl Exception {
    /// Creates an exception for the occurrence originally starting at `rec_id`.
    #[must_use]
    pub fn new(rec_id: DateTime<Utc>, overrides: EventOverrides) -> Self {
        Self {
            id: Uuid::now_v7(),
            rec_id,
            deleted: false,
            ics_uid: None,
            overrides,
        }
    }

    /// Creates a deletion marker for the occurrence at `rec_id`.
    #[must_use]
    pub fn deletion(rec_id: DateTime<Utc>) -> Self {
        Self {
            deleted: true,
            ..Self::new(rec_id, EventOverrides::default())
        }
    }

    /// Identity assigned when the occurrence was promoted to an exception.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Original, unedited start of the occurrence this exception overrides.
    #[must_use]
    pub const fn rec_id(&self) -> DateTime<Utc> {
        self.rec_id
    }

    /// Start the occurrence is displayed at: the override if any, else `rec_id`.
    #[must_use]
    pub fn effective_start(&self) -> DateTime<Utc> {
        self.overrides.start.unwrap_or(self.rec_id)
    }
}

/// An event document: display fields, optional rule and its exceptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentEvent {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: EventDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
    /// Cached upper bound of the series; absent for never-ending rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<Exception>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ics_uid: Option<String>,
}

impl ParentEvent {
    /// Creates a non-recurring event, labelling it `unlabeled` if it has no labels.
    #[must_use]
    pub fn new(mut details: EventDetails) -> Self {
        if details.labels.is_empty() {
            details.labels.push(UNLABELED.to_string());
        }
        Self {
            id: Uuid::new_v4(),
            details,
            recurrence: None,
            recurrence_end: None,
            exceptions: Vec::new(),
            ics_uid: None,
        }
    }

    #[must_use]
    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }

    #[must_use]
    pub fn with_exception(mut self, exception: Exception) -> Self {
        self.exceptions.push(exception);
        self
    }

    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// ## Summary
    /// Start of the series in the reference zone.
    ///
    /// All-day events anchor at midnight UTC of their start date.
    #[must_use]
    pub fn anchor(&self) -> DateTime<Utc> {
        if self.details.all_day {
            all_day_marker(self.details.start)
        } else {
            self.details.start
        }
    }
}

/// How a materialized instance relates to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstanceIdentity {
    /// A non-recurring event shown as itself.
    Standalone,
    /// An unedited occurrence generated from the rule.
    Occurrence,
    /// An unedited occurrence synthesized ahead of its first edit.
    Preview { rec_id: DateTime<Utc> },
    /// An occurrence backed by a stored exception.
    Promoted { id: Uuid, rec_id: DateTime<Utc> },
}

/// A fully resolved event, produced fresh for each query and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualInstance {
    /// Id of the parent event.
    pub sid: Uuid,
    #[serde(flatten)]
    pub identity: InstanceIdentity,
    #[serde(flatten)]
    pub details: EventDetails,
}

impl VirtualInstance {
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.details.start
    }

    /// Original slot of the occurrence, when it has one.
    #[must_use]
    pub const fn rec_id(&self) -> Option<DateTime<Utc>> {
        match self.identity {
            InstanceIdentity::Preview { rec_id } | InstanceIdentity::Promoted { rec_id, .. } => {
                Some(rec_id)
            }
            InstanceIdentity::Standalone | InstanceIdentity::Occurrence => None,
        }
    }

    /// Exception identity, for instances backed by a stored exception.
    #[must_use]
    pub const fn exception_id(&self) -> Option<Uuid> {
        match self.identity {
            InstanceIdentity::Promoted { id, .. } => Some(id),
            _ => None,
        }
    }
}
