#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Subcommands driven by JSON event documents on disk.

use std::path::PathBuf;

use cadence_test::component::cli::boundary::BoundaryArgs;
use cadence_test::component::cli::expand::ExpandArgs;
use cadence_test::component::cli::occurrence::OccurrenceArgs;
use cadence_test::component::cli::rrule::{RruleArgs, ics_lines};
use cadence_test::component::cli::{Commands, read_event, read_events};
use cadence_test::component::config::{EngineConfig, LoggingConfig, Settings};
use cadence_test::component::event::{EventDetails, EventOverrides, Exception, ParentEvent};
use serde_json::Value;

use super::helpers::*;

/// Event document written to a unique temporary file, removed on drop.
struct Document {
    path: PathBuf,
}

impl Document {
    fn write(json: &str) -> Self {
        let path = std::env::temp_dir().join(format!("cadence-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, json).expect("write event document");
        Self { path }
    }

    fn of(events: &[ParentEvent]) -> Self {
        Self::write(&serde_json::to_string(events).expect("serialize events"))
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::debug!(path = %self.path.display(), %err, "Leaving event document behind");
        }
    }
}

fn settings() -> Settings {
    Settings {
        engine: EngineConfig::default(),
        logging: LoggingConfig {
            level: "info".into(),
        },
    }
}

fn edited_series() -> ParentEvent {
    study_series()
        .with_exception(Exception::deletion(june(2, 19, 0)))
        .with_exception(Exception::new(
            june(5, 19, 0),
            EventOverrides {
                title: Some("Exam prep".into()),
                ..EventOverrides::default()
            },
        ))
}

/// ## Summary
/// Expanding a document of two events merges and orders their instances.
#[test_log::test]
fn expand_prints_ordered_instances() {
    let single = ParentEvent::new(
        EventDetails::new("Orientation", june(5, 9, 0)).with_end(june(5, 10, 0)),
    );
    let document = Document::of(&[edited_series(), single]);

    let output = Commands::Expand(ExpandArgs {
        event: document.path.clone(),
        start: Some(june(1, 0, 0)),
        end: Some(june(8, 0, 0)),
    })
    .run(&settings())
    .unwrap();
    let instances: Vec<Value> = serde_json::from_str(&output).unwrap();

    let titles: Vec<&str> = instances
        .iter()
        .map(|instance| instance["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Study group",
            "Orientation",
            "Exam prep",
            "Study group",
            "Study group"
        ]
    );
    assert_eq!(instances[0]["kind"], "occurrence");
    assert_eq!(instances[1]["kind"], "standalone");
    assert_eq!(instances[2]["kind"], "promoted");
    assert_eq!(instances[2]["rec_id"], "2017-06-05T19:00:00Z");
}

/// ## Summary
/// The occurrence subcommand prints a preview, or `null` for a deleted slot.
#[test]
fn occurrence_previews_and_deletions() {
    let document = Document::of(&[edited_series()]);
    let run = |rec_id| {
        Commands::Occurrence(OccurrenceArgs {
            event: document.path.clone(),
            rec_id,
        })
        .run(&settings())
        .unwrap()
    };

    let preview: Value = serde_json::from_str(&run(june(6, 19, 0))).unwrap();
    assert_eq!(preview["kind"], "preview");
    assert_eq!(preview["start"], "2017-06-06T19:00:00Z");

    let deleted: Value = serde_json::from_str(&run(june(2, 19, 0))).unwrap();
    assert_eq!(deleted, Value::Null);
}

/// ## Summary
/// The boundary subcommand reports the cached end of the series.
#[test]
fn boundary_reports_recurrence_end() {
    let parent = edited_series();
    let document = Document::of(std::slice::from_ref(&parent));

    let output = Commands::Boundary(BoundaryArgs {
        event: document.path.clone(),
    })
    .run(&settings())
    .unwrap();
    let report: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["sid"], parent.id.to_string());
    assert_eq!(report["recurrence_end"], "2017-07-29T19:00:00Z");
}

/// ## Summary
/// ICS export lists the rule, the deletion and the override slot.
#[test]
fn rrule_exports_ics_lines() {
    let document = Document::of(&[edited_series()]);
    let parent = read_event(&document.path).unwrap();
    assert_eq!(
        ics_lines(&parent).unwrap(),
        "RRULE:FREQ=WEEKLY;INTERVAL=1;UNTIL=20170731T000000Z;BYDAY=MO,TU,WE,TH,FR\n\
         EXDATE:20170602T190000Z\n\
         RECURRENCE-ID:20170605T190000Z"
    );

    let parsed = Commands::Rrule(RruleArgs {
        event: None,
        parse: Some("FREQ=DAILY;COUNT=3".into()),
    })
    .run(&settings())
    .unwrap();
    let rule: Value = serde_json::from_str(&parsed).unwrap();
    assert_eq!(rule["frequency"], "DAILY");
    assert_eq!(rule["count"], 3);
}

/// ## Summary
/// Documents round-trip through JSON with their exceptions intact.
#[test]
fn documents_keep_exceptions() {
    let parent = edited_series();
    let document = Document::of(std::slice::from_ref(&parent));
    let events = read_events(&document.path).unwrap();
    assert_eq!(events, vec![parent]);

    let both = Document::of(&[study_series(), study_series()]);
    assert!(read_event(&both.path).is_err());
}
