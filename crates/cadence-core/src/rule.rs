//! Recurrence rule embedded in a parent event.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{DayToken, Frequency};

/// A recurrence rule: frequency, step, termination and `by_*` filters.
///
/// The three termination fields (`count`, `until`, `forever`) are stored as
/// they were supplied. They are meant to be mutually exclusive, but resolving
/// them into a single termination mode is the recurrence engine's job so that
/// an ambiguous rule surfaces as a configuration error instead of being
/// silently repaired here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleDocument")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: NonZeroU32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<NonZeroU32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub forever: bool,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub by_day: BTreeSet<DayToken>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub by_month_day: BTreeSet<i8>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub by_month: BTreeSet<u8>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub by_year_day: BTreeSet<i16>,
}

/// Wire shape of a rule before range validation.
#[derive(Debug, Deserialize)]
struct RuleDocument {
    frequency: Frequency,
    #[serde(default = "default_interval")]
    interval: NonZeroU32,
    #[serde(default)]
    count: Option<NonZeroU32>,
    #[serde(default)]
    until: Option<DateTime<Utc>>,
    #[serde(default)]
    forever: bool,
    #[serde(default)]
    by_day: BTreeSet<DayToken>,
    #[serde(default)]
    by_month_day: BTreeSet<i8>,
    #[serde(default)]
    by_month: BTreeSet<u8>,
    #[serde(default)]
    by_year_day: BTreeSet<i16>,
}

const fn default_interval() -> NonZeroU32 {
    NonZeroU32::MIN
}

impl TryFrom<RuleDocument> for RecurrenceRule {
    type Error = CoreError;

    fn try_from(doc: RuleDocument) -> CoreResult<Self> {
        let rule = Self {
            frequency: doc.frequency,
            interval: doc.interval,
            count: doc.count,
            until: doc.until,
            forever: doc.forever,
            by_day: doc.by_day,
            by_month_day: doc.by_month_day,
            by_month: doc.by_month,
            by_year_day: doc.by_year_day,
        };
        rule.validate()?;
        Ok(rule)
    }
}

impl RecurrenceRule {
    /// Creates an open-ended rule stepping every single frequency unit.
    #[must_use]
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: NonZeroU32::MIN,
            count: None,
            until: None,
            forever: false,
            by_day: BTreeSet::new(),
            by_month_day: BTreeSet::new(),
            by_month: BTreeSet::new(),
            by_year_day: BTreeSet::new(),
        }
    }

    /// ## Summary
    /// Sets the step between periods.
    ///
    /// ## Errors
    /// Returns `ValidationError` if `interval` is zero.
    pub fn with_interval(mut self, interval: u32) -> CoreResult<Self> {
        self.interval = NonZeroU32::new(interval)
            .ok_or_else(|| CoreError::ValidationError("interval must be positive".into()))?;
        Ok(self)
    }

    /// ## Summary
    /// Terminates the rule after `count` occurrences.
    ///
    /// ## Errors
    /// Returns `ValidationError` if `count` is zero.
    pub fn with_count(mut self, count: u32) -> CoreResult<Self> {
        self.count = Some(
            NonZeroU32::new(count)
                .ok_or_else(|| CoreError::ValidationError("count must be positive".into()))?,
        );
        Ok(self)
    }

    /// Terminates the rule at `until` (inclusive).
    #[must_use]
    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Marks the rule as never ending.
    #[must_use]
    pub fn with_forever(mut self) -> Self {
        self.forever = true;
        self
    }

    #[must_use]
    pub fn with_by_day(mut self, days: impl IntoIterator<Item = DayToken>) -> Self {
        self.by_day.extend(days);
        self
    }

    /// ## Errors
    /// Returns `ValidationError` for a day outside `±1..=31`.
    pub fn with_by_month_day(mut self, days: impl IntoIterator<Item = i8>) -> CoreResult<Self> {
        self.by_month_day.extend(days);
        self.validate()?;
        Ok(self)
    }

    /// ## Errors
    /// Returns `ValidationError` for a month outside `1..=12`.
    pub fn with_by_month(mut self, months: impl IntoIterator<Item = u8>) -> CoreResult<Self> {
        self.by_month.extend(months);
        self.validate()?;
        Ok(self)
    }

    /// ## Errors
    /// Returns `ValidationError` for a day outside `±1..=366`.
    pub fn with_by_year_day(mut self, days: impl IntoIterator<Item = i16>) -> CoreResult<Self> {
        self.by_year_day.extend(days);
        self.validate()?;
        Ok(self)
    }

    /// ## Summary
    /// Checks the ranges of every `by_*` value.
    ///
    /// Termination ambiguity is left to the engine.
    ///
    /// ## Errors
    /// Returns `ValidationError` naming the first offending field.
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(bad) = self
            .by_month_day
            .iter()
            .find(|day| **day == 0 || !(-31..=31).contains(*day))
        {
            return Err(CoreError::ValidationError(format!(
                "by_month_day value {bad} is outside ±1..=31"
            )));
        }
        if let Some(bad) = self
            .by_month
            .iter()
            .find(|month| !(1..=12).contains(*month))
        {
            return Err(CoreError::ValidationError(format!(
                "by_month value {bad} is outside 1..=12"
            )));
        }
        if let Some(bad) = self
            .by_year_day
            .iter()
            .find(|day| **day == 0 || !(-366..=366).contains(*day))
        {
            return Err(CoreError::ValidationError(format!(
                "by_year_day value {bad} is outside ±1..=366"
            )));
        }
        Ok(())
    }

    /// Returns true when the rule carries a `count` or `until` terminator.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.count.is_some() || self.until.is_some()
    }
}
