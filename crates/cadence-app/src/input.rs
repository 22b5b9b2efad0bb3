//! Reading parent-event documents.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use cadence_core::event::ParentEvent;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Documents {
    Many(Vec<ParentEvent>),
    One(Box<ParentEvent>),
}

/// ## Summary
/// Reads one parent-event document or an array of them.
///
/// `-` reads standard input.
///
/// ## Errors
/// Returns an error if the source cannot be read or is not valid JSON.
pub fn read_events(path: &Path) -> anyhow::Result<Vec<ParentEvent>> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading standard input")?;
        text
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    let events = parse_events(&text).with_context(|| format!("parsing {}", path.display()))?;
    tracing::debug!(path = %path.display(), events = events.len(), "Loaded event documents");
    Ok(events)
}

/// ## Summary
/// Reads exactly one parent-event document.
///
/// ## Errors
/// Returns an error if reading fails or the source holds more or fewer than one event.
pub fn read_event(path: &Path) -> anyhow::Result<ParentEvent> {
    let mut events = read_events(path)?;
    match events.len() {
        1 => events
            .pop()
            .context("event list emptied while reading"),
        n => anyhow::bail!("{} holds {n} events, expected exactly one", path.display()),
    }
}

fn parse_events(text: &str) -> serde_json::Result<Vec<ParentEvent>> {
    Ok(match serde_json::from_str(text)? {
        Documents::Many(events) => events,
        Documents::One(event) => vec![*event],
    })
}
