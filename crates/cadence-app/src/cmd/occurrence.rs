//! `cadence occurrence`: one occurrence by its original slot.

use std::path::PathBuf;

use cadence_engine::materialize_one;
use chrono::{DateTime, Utc};
use clap::Args;

use crate::input::read_event;

#[derive(Args, Debug)]
pub struct OccurrenceArgs {
    /// Parent event JSON document (`-` for stdin)
    pub event: PathBuf,

    /// Original start of the occurrence (RFC 3339)
    #[arg(long)]
    pub rec_id: DateTime<Utc>,
}

/// ## Summary
/// Materializes the occurrence at `--rec-id` as JSON, `null` if there is none.
///
/// ## Errors
/// Returns input and rule expansion errors.
pub fn run_occurrence(args: &OccurrenceArgs) -> anyhow::Result<String> {
    let parent = read_event(&args.event)?;
    let instance = materialize_one(&parent, args.rec_id)?;
    if instance.is_none() {
        tracing::info!(sid = %parent.id, rec_id = %args.rec_id, "No such occurrence");
    }
    Ok(serde_json::to_string_pretty(&instance)?)
}
