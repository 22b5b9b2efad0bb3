//! `cadence expand`: windowed materialization.

use std::path::PathBuf;

use cadence_core::config::{EngineConfig, Settings};
use cadence_core::error::{CoreError, CoreResult};
use cadence_core::window::Window;
use cadence_engine::materialize_all;
use chrono::{DateTime, Months, Utc};
use clap::Args;

use crate::input::read_events;

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Parent event JSON document, or an array of them (`-` for stdin)
    pub event: PathBuf,

    /// Inclusive window start (RFC 3339)
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,

    /// Exclusive window end (RFC 3339)
    #[arg(long)]
    pub end: Option<DateTime<Utc>>,
}

/// ## Summary
/// Resolves the query window from optional bounds.
///
/// With no bounds the configured window around `now` is used. A single
/// bound is extended by the default span. The result may be no wider than
/// the configured maximum.
///
/// ## Errors
/// Returns `InvalidInput` for an empty, inverted or too wide window.
pub fn resolve_window(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    engine: &EngineConfig,
    now: DateTime<Utc>,
) -> CoreResult<Window> {
    let span = Months::new(engine.default_months_before + engine.default_months_after);
    let out_of_range = || CoreError::InvalidInput("window bound out of range".into());
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, start.checked_add_months(span).ok_or_else(out_of_range)?),
        (None, Some(end)) => (end.checked_sub_months(span).ok_or_else(out_of_range)?, end),
        (None, None) => {
            let window =
                Window::around(now, engine.default_months_before, engine.default_months_after)?;
            (window.start(), window.end())
        }
    };
    Window::bounded(start, end, engine.max_window())
}

/// ## Summary
/// Materializes the events in the file over the resolved window, as JSON.
///
/// ## Errors
/// Returns input, window and rule expansion errors.
pub fn run_expand(args: &ExpandArgs, settings: &Settings) -> anyhow::Result<String> {
    let events = read_events(&args.event)?;
    let window = resolve_window(args.start, args.end, &settings.engine, Utc::now())?;
    let instances = materialize_all(&events, &window)?;
    tracing::info!(%window, instances = instances.len(), "Expanded events");
    Ok(serde_json::to_string_pretty(&instances)?)
}
