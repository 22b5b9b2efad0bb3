//! `cadence boundary`: the cached upper bound of a series.

use std::path::PathBuf;

use cadence_engine::boundary::refresh;
use clap::Args;
use serde_json::json;

use crate::input::read_event;

#[derive(Args, Debug)]
pub struct BoundaryArgs {
    /// Parent event JSON document (`-` for stdin)
    pub event: PathBuf,
}

/// ## Summary
/// Recomputes `recurrence_end` and prints it with the event id.
///
/// ## Errors
/// Returns input errors and `Configuration` for a rule without terminator.
pub fn run_boundary(args: &BoundaryArgs) -> anyhow::Result<String> {
    let mut parent = read_event(&args.event)?;
    let end = refresh(&mut parent)?;
    Ok(serde_json::to_string_pretty(&json!({
        "sid": parent.id,
        "recurrence_end": end,
    }))?)
}
