//! Half-open query windows.

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// A caller-supplied `[start, end)` time range bounding a materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    /// ## Summary
    /// Creates a window from its inclusive start and exclusive end.
    ///
    /// ## Errors
    /// Returns `InvalidInput` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if start >= end {
            return Err(CoreError::InvalidInput(format!(
                "window start {start} must precede end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// ## Summary
    /// Creates a window no wider than `max_width`.
    ///
    /// Used at the request boundary so that expanding a never-ending rule
    /// always terminates in bounded time.
    ///
    /// ## Errors
    /// Returns `InvalidInput` if the window is empty, inverted or too wide.
    pub fn bounded(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        max_width: TimeDelta,
    ) -> CoreResult<Self> {
        let window = Self::new(start, end)?;
        if window.width() > max_width {
            return Err(CoreError::InvalidInput(format!(
                "window of {} days exceeds the maximum of {} days",
                window.width().num_days(),
                max_width.num_days()
            )));
        }
        Ok(window)
    }

    /// ## Summary
    /// Default window reaching `months_before` back and `months_after` ahead of `now`.
    ///
    /// ## Errors
    /// Returns `InvalidInput` if the month arithmetic leaves chrono's range
    /// or both spans are zero.
    pub fn around(now: DateTime<Utc>, months_before: u32, months_after: u32) -> CoreResult<Self> {
        let start = now
            .checked_sub_months(Months::new(months_before))
            .ok_or_else(|| CoreError::InvalidInput("default window start out of range".into()))?;
        let end = now
            .checked_add_months(Months::new(months_after))
            .ok_or_else(|| CoreError::InvalidInput("default window end out of range".into()))?;
        Self::new(start, end)
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn width(&self) -> TimeDelta {
        self.end.signed_duration_since(self.start)
    }

    /// Returns true if `ts` lies in `[start, end)`.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }

    /// ## Summary
    /// Returns true if an event spanning `[start, end)` intersects the window.
    ///
    /// An event without an end, or with a zero length, is a point at `start`.
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> bool {
        match end {
            Some(end) if end > start => start < self.end && end > self.start,
            _ => self.contains(start),
        }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
