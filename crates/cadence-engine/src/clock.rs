//! Calendar arithmetic for recurrence rules.
//!
//! A rule is expanded one period at a time (a day, a Monday-started week, a
//! month or a year, every `interval` of them). Each period yields a sorted
//! set of candidate dates; candidates take the anchor's UTC time of day and
//! are then cut by the anchor, the terminator and the caller's window.

use std::collections::{BTreeSet, VecDeque};
use std::num::NonZeroU32;

use cadence_core::event::{ParentEvent, all_day_marker};
use cadence_core::rule::RecurrenceRule;
use cadence_core::types::Frequency;
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};

use crate::error::{EngineError, EngineResult};

/// ## Summary
/// Number of periods after which the Gregorian calendar repeats exactly,
/// weekdays included: 400 years, or 146 097 days.
///
/// A rule that stays empty for a whole cycle past the anchor's period can
/// never match again, whatever its interval.
#[must_use]
pub const fn calendar_cycle(frequency: Frequency) -> u32 {
    match frequency {
        Frequency::Yearly => 400,
        Frequency::Monthly => 4_800,
        Frequency::Weekly => 20_871,
        Frequency::Daily => 146_097,
    }
}

/// How a rule ends, resolved from its terminator fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Count(NonZeroU32),
    Until(DateTime<Utc>),
    Forever,
    /// No terminator at all: bounded only by the caller's window.
    Open,
}

impl Termination {
    /// ## Summary
    /// Resolves the mutually exclusive `count`/`until`/`forever` fields.
    ///
    /// ## Errors
    /// Returns `Configuration` if more than one of them is set.
    pub fn of(rule: &RecurrenceRule) -> EngineResult<Self> {
        match (rule.count, rule.until, rule.forever) {
            (Some(count), None, false) => Ok(Self::Count(count)),
            (None, Some(until), false) => Ok(Self::Until(until)),
            (None, None, true) => Ok(Self::Forever),
            (None, None, false) => Ok(Self::Open),
            (count, until, forever) => Err(EngineError::Configuration(format!(
                "at most one terminator may be set, got count={count:?} until={until:?} forever={forever}"
            ))),
        }
    }

    /// Returns true if the series ends on its own.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        matches!(self, Self::Count(_) | Self::Until(_))
    }
}

/// Generates occurrence start times for a rule anchored at a start time.
#[derive(Debug, Clone, Copy)]
pub struct RuleClock<'a> {
    rule: &'a RecurrenceRule,
    anchor: DateTime<Utc>,
}

impl<'a> RuleClock<'a> {
    #[must_use]
    pub const fn new(rule: &'a RecurrenceRule, anchor: DateTime<Utc>) -> Self {
        Self { rule, anchor }
    }

    /// Clock for an all-day series: every occurrence is a midnight-UTC marker.
    #[must_use]
    pub fn all_day(rule: &'a RecurrenceRule, anchor: DateTime<Utc>) -> Self {
        Self::new(rule, all_day_marker(anchor))
    }

    /// Clock for a parent event's rule, or `None` if it does not recur.
    #[must_use]
    pub fn for_event(parent: &'a ParentEvent) -> Option<Self> {
        parent
            .recurrence
            .as_ref()
            .map(|rule| Self::new(rule, parent.anchor()))
    }

    #[must_use]
    pub const fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    /// ## Summary
    /// Collects the occurrences in `[window_start, window_end)`.
    ///
    /// Either bound may be omitted. The result is strictly increasing and
    /// identical for identical inputs.
    ///
    /// ## Errors
    /// Returns `Configuration` for an ambiguous terminator, or for a
    /// `forever`/open rule without a `window_end`. Returns `CoreError` if the
    /// rule's `by_*` values are out of range.
    pub fn generate(
        &self,
        window_start: Option<DateTime<Utc>>,
        window_end: Option<DateTime<Utc>>,
    ) -> EngineResult<Vec<DateTime<Utc>>> {
        let occurrences: Vec<_> = self.occurrences(window_start, window_end)?.collect();
        tracing::debug!(
            frequency = %self.rule.frequency,
            anchor = %self.anchor,
            ?window_start,
            ?window_end,
            count = occurrences.len(),
            "Generated occurrences"
        );
        Ok(occurrences)
    }

    /// ## Summary
    /// Lazily enumerates the occurrences in `[window_start, window_end)`.
    ///
    /// Count rules are always enumerated from the anchor, since the window
    /// cannot tell which occurrences are within the first N. Other rules skip
    /// straight to the period containing `window_start`.
    ///
    /// ## Errors
    /// Same as [`Self::generate`].
    pub fn occurrences(
        &self,
        window_start: Option<DateTime<Utc>>,
        window_end: Option<DateTime<Utc>>,
    ) -> EngineResult<Occurrences<'a>> {
        self.rule.validate()?;
        let termination = Termination::of(self.rule)?;
        if !termination.is_finite() && window_end.is_none() {
            return Err(EngineError::Configuration(format!(
                "{termination:?} {} rule cannot be enumerated without a window end",
                self.rule.frequency
            )));
        }

        let expander = Expander::new(self.rule, self.anchor);
        let first_period = match (termination, window_start) {
            (Termination::Count(_), _) | (_, None) => 0,
            (_, Some(start)) if start <= self.anchor => 0,
            (_, Some(start)) => {
                let period = expander.period_containing(start.date_naive());
                tracing::trace!(period, %start, "Skipping ahead to window start");
                period
            }
        };

        Ok(Occurrences {
            expander,
            termination,
            window_start,
            window_end,
            period: first_period,
            pending: VecDeque::new(),
            produced: 0,
            idle: 0,
            done: false,
        })
    }
}

/// Iterator over a rule's occurrences; clone it to restart from the same point.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    expander: Expander<'a>,
    termination: Termination,
    window_start: Option<DateTime<Utc>>,
    window_end: Option<DateTime<Utc>>,
    period: u64,
    pending: VecDeque<DateTime<Utc>>,
    produced: u32,
    idle: u32,
    done: bool,
}

impl Occurrences<'_> {
    /// Earliest instant past which nothing can be produced.
    fn stop_bound(&self) -> Option<DateTime<Utc>> {
        let until = match self.termination {
            Termination::Until(until) => Some(until),
            _ => None,
        };
        match (until, self.window_end) {
            (Some(until), Some(end)) => Some(until.min(end)),
            (until, end) => until.or(end),
        }
    }

    /// Expands the next period into `pending`. Returns false once exhausted.
    fn refill(&mut self) -> bool {
        let Some((period_start, dates)) = self.expander.expand(self.period) else {
            tracing::trace!(period = self.period, "Calendar range exhausted");
            return false;
        };
        self.period += 1;

        if self
            .stop_bound()
            .is_some_and(|bound| at_midnight(period_start) > bound)
        {
            return false;
        }

        let before = self.pending.len();
        self.pending.extend(
            dates
                .into_iter()
                .map(|date| date.and_time(self.expander.time).and_utc())
                .filter(|ts| *ts >= self.expander.anchor),
        );

        if self.pending.len() == before {
            self.idle += 1;
            // The anchor's period may be cut short, so allow one past a full cycle.
            if self.idle > calendar_cycle(self.expander.rule.frequency) {
                tracing::warn!(
                    frequency = %self.expander.rule.frequency,
                    anchor = %self.expander.anchor,
                    periods = self.idle,
                    "Rule produced no occurrence in a full calendar cycle, treating as exhausted"
                );
                return false;
            }
        } else {
            self.idle = 0;
        }
        true
    }
}

impl Iterator for Occurrences<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(ts) = self.pending.pop_front() {
                let past_until =
                    matches!(self.termination, Termination::Until(until) if ts > until);
                let past_window = self.window_end.is_some_and(|end| ts >= end);
                let past_count =
                    matches!(self.termination, Termination::Count(count) if self.produced >= count.get());
                if past_until || past_window || past_count {
                    self.done = true;
                    self.pending.clear();
                    return None;
                }
                self.produced += 1;
                if self.window_start.is_some_and(|start| ts < start) {
                    continue;
                }
                return Some(ts);
            }
            if self.done || !self.refill() {
                self.done = true;
                return None;
            }
        }
    }
}

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        .unwrap_or(date)
}

fn days_in_month(date: NaiveDate) -> i64 {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .map_or(31, |next| next.signed_duration_since(first).num_days())
}

fn days_in_year(year: i32) -> i64 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// Per-period expansion and filtering for one rule.
#[derive(Debug, Clone, Copy)]
struct Expander<'a> {
    rule: &'a RecurrenceRule,
    anchor: DateTime<Utc>,
    date: NaiveDate,
    time: NaiveTime,
}

impl<'a> Expander<'a> {
    fn new(rule: &'a RecurrenceRule, anchor: DateTime<Utc>) -> Self {
        Self {
            rule,
            anchor,
            date: anchor.date_naive(),
            time: anchor.time(),
        }
    }

    fn interval(&self) -> u64 {
        u64::from(self.rule.interval.get())
    }

    /// Index of the period that contains `date`, counted from the anchor's.
    fn period_containing(&self, date: NaiveDate) -> u64 {
        let units = match self.rule.frequency {
            Frequency::Yearly => i64::from(date.year() - self.date.year()),
            Frequency::Monthly => month_index(date) - month_index(self.date),
            Frequency::Weekly => {
                week_start(date)
                    .signed_duration_since(week_start(self.date))
                    .num_days()
                    / 7
            }
            Frequency::Daily => date.signed_duration_since(self.date).num_days(),
        };
        u64::try_from(units).map_or(0, |units| units / self.interval())
    }

    /// ## Summary
    /// Expands period `k` into its first day and its sorted candidate dates.
    ///
    /// Returns `None` once the period falls outside chrono's calendar range.
    fn expand(&self, k: u64) -> Option<(NaiveDate, BTreeSet<NaiveDate>)> {
        let step = k.checked_mul(self.interval())?;
        match self.rule.frequency {
            Frequency::Yearly => self.yearly(step),
            Frequency::Monthly => self.monthly(step),
            Frequency::Weekly => self.weekly(step),
            Frequency::Daily => self.daily(step),
        }
    }

    /// Same month and day as the anchor; `by_*` fields are not consulted.
    fn yearly(&self, step: u64) -> Option<(NaiveDate, BTreeSet<NaiveDate>)> {
        let year = i32::try_from(i64::from(self.date.year()).checked_add(i64::try_from(step).ok()?)?)
            .ok()?;
        let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let dates = NaiveDate::from_ymd_opt(year, self.date.month(), self.date.day())
            .into_iter()
            .collect();
        Some((first, dates))
    }

    fn monthly(&self, step: u64) -> Option<(NaiveDate, BTreeSet<NaiveDate>)> {
        let index = month_index(self.date).checked_add(i64::try_from(step).ok()?)?;
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let length = days_in_month(first);

        let days: BTreeSet<i64> = if !self.rule.by_day.is_empty() {
            (1..=length)
                .filter(|day| {
                    first
                        .checked_add_days(Days::new(u64::try_from(day - 1).unwrap_or_default()))
                        .is_some_and(|date| self.satisfies_by_day(date))
                })
                .collect()
        } else if !self.rule.by_month_day.is_empty() {
            self.rule
                .by_month_day
                .iter()
                .map(|day| {
                    let day = i64::from(*day);
                    if day > 0 { day } else { length + 1 + day }
                })
                .filter(|day| (1..=length).contains(day))
                .collect()
        } else {
            let day = i64::from(self.date.day());
            if day <= length {
                BTreeSet::from([day])
            } else {
                BTreeSet::new()
            }
        };

        let dates = days
            .into_iter()
            .filter_map(|day| first.checked_add_days(Days::new(u64::try_from(day - 1).ok()?)))
            .filter(|date| self.satisfies_by_month(*date) && self.satisfies_by_year_day(*date))
            .collect();
        Some((first, dates))
    }

    fn weekly(&self, step: u64) -> Option<(NaiveDate, BTreeSet<NaiveDate>)> {
        let first = week_start(self.date).checked_add_days(Days::new(step.checked_mul(7)?))?;
        let offsets: BTreeSet<u32> = if self.rule.by_day.is_empty() {
            BTreeSet::from([self.date.weekday().num_days_from_monday()])
        } else {
            self.rule
                .by_day
                .iter()
                .map(|day| day.weekday().num_days_from_monday())
                .collect()
        };
        let dates = offsets
            .into_iter()
            .filter_map(|offset| first.checked_add_days(Days::new(u64::from(offset))))
            .filter(|date| {
                self.satisfies_by_month(*date)
                    && self.satisfies_by_month_day(*date)
                    && self.satisfies_by_year_day(*date)
            })
            .collect();
        Some((first, dates))
    }

    fn daily(&self, step: u64) -> Option<(NaiveDate, BTreeSet<NaiveDate>)> {
        let date = self.date.checked_add_days(Days::new(step))?;
        let keep = self.satisfies_by_day(date)
            && self.satisfies_by_month(date)
            && self.satisfies_by_month_day(date)
            && self.satisfies_by_year_day(date);
        let dates = if keep {
            BTreeSet::from([date])
        } else {
            BTreeSet::new()
        };
        Some((date, dates))
    }

    fn satisfies_by_day(&self, date: NaiveDate) -> bool {
        self.rule.by_day.is_empty()
            || self
                .rule
                .by_day
                .iter()
                .any(|day| day.weekday() == date.weekday())
    }

    fn satisfies_by_month(&self, date: NaiveDate) -> bool {
        self.rule.by_month.is_empty()
            || self
                .rule
                .by_month
                .iter()
                .any(|month| u32::from(*month) == date.month())
    }

    /// Negative values count back from the last day of the month (-1 is the last day).
    fn satisfies_by_month_day(&self, date: NaiveDate) -> bool {
        if self.rule.by_month_day.is_empty() {
            return true;
        }
        let positive = i64::from(date.day());
        let negative = positive - 1 - days_in_month(date);
        self.rule
            .by_month_day
            .iter()
            .any(|day| i64::from(*day) == positive || i64::from(*day) == negative)
    }

    /// Negative values count back from the last day of the year (-1 is Dec 31).
    fn satisfies_by_year_day(&self, date: NaiveDate) -> bool {
        if self.rule.by_year_day.is_empty() {
            return true;
        }
        let positive = i64::from(date.ordinal());
        let negative = positive - 1 - days_in_year(date.year());
        self.rule
            .by_year_day
            .iter()
            .any(|day| i64::from(*day) == positive || i64::from(*day) == negative)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
