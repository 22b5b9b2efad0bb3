#![allow(clippy::expect_used, clippy::unwrap_used)]
//! End-to-end materialization scenarios.
//!
//! Covers the weekday study series with deletions, moved occurrences and
//! never-ending rules, plus the overlay and boundary properties.

use cadence_test::component::engine::boundary::refresh;
use cadence_test::component::engine::edit::create_exception;
use cadence_test::component::engine::{
    EngineError, OverlayMerger, RuleClock, compute_recurrence_end, materialize, materialize_one,
};
use cadence_test::component::event::{
    EventDetails, EventOverrides, Exception, InstanceIdentity, ParentEvent, VirtualInstance,
};
use cadence_test::component::rule::RecurrenceRule;
use cadence_test::component::types::{DayToken, Frequency};

use super::helpers::*;

/// ## Summary
/// The first week of the weekday series yields Thursday to Wednesday.
#[test_log::test]
fn weekday_series_first_week() {
    let parent = study_series();
    let instances = materialize(&parent, &window(june(1, 0, 0), june(8, 0, 0))).unwrap();

    assert_eq!(instances.len(), 5);
    assert_eq!(
        starts(&instances),
        vec![
            june(1, 19, 0),
            june(2, 19, 0),
            june(5, 19, 0),
            june(6, 19, 0),
            june(7, 19, 0),
        ]
    );
    assert!(
        instances
            .iter()
            .all(|instance| instance.identity == InstanceIdentity::Occurrence)
    );
    assert!(instances.iter().all(|instance| instance.sid == parent.id));
}

/// ## Summary
/// A deleted Friday disappears while the rule still generates it.
#[test_log::test]
fn deleted_occurrence_is_suppressed() {
    let parent = study_series().with_exception(Exception::deletion(june(2, 19, 0)));
    let week = window(june(1, 0, 0), june(8, 0, 0));

    let generated = RuleClock::for_event(&parent)
        .unwrap()
        .generate(Some(week.start()), Some(week.end()))
        .unwrap();
    assert!(generated.contains(&june(2, 19, 0)));

    let instances = materialize(&parent, &week).unwrap();
    assert_eq!(instances.len(), 4);
    assert!(!starts(&instances).contains(&june(2, 19, 0)));
}

/// ## Summary
/// A moved and renamed occurrence replaces its slot.
#[test_log::test]
fn moved_occurrence_shows_its_overrides() {
    let parent = study_series().with_exception(Exception::new(
        june(1, 19, 0),
        EventOverrides {
            title: Some("Moved".into()),
            start: Some(june(1, 20, 0)),
            ..EventOverrides::default()
        },
    ));
    let instances = materialize(&parent, &window(june(1, 0, 0), june(2, 0, 0))).unwrap();

    assert_eq!(instances.len(), 1);
    let moved = &instances[0];
    assert_eq!(moved.details.title, "Moved");
    assert_eq!(moved.start(), june(1, 20, 0));
    assert_eq!(moved.details.end, Some(june(1, 22, 0)));
    assert_eq!(moved.details.location.as_deref(), Some("Library"));
    assert_eq!(moved.rec_id(), Some(june(1, 19, 0)));
}

/// ## Summary
/// A never-ending rule over a one-year window terminates with a bounded result.
#[test_log::test]
fn forever_rule_over_a_year() {
    let mut parent = ParentEvent::new(EventDetails::new("Open lab", june(1, 19, 0)))
        .with_recurrence(
            RecurrenceRule::new(Frequency::Weekly)
                .with_by_day([DayToken::MO, DayToken::TH])
                .with_forever(),
        );
    let year = window(at(2018, 1, 1, 0, 0), at(2019, 1, 1, 0, 0));
    let instances = materialize(&parent, &year).unwrap();

    assert_eq!(instances.len(), 105);
    assert!(instances.iter().all(|instance| year.contains(instance.start())));
    assert_eq!(
        instances.first().map(VirtualInstance::start),
        Some(at(2018, 1, 1, 19, 0))
    );
    assert_eq!(
        instances.last().map(VirtualInstance::start),
        Some(at(2018, 12, 31, 19, 0))
    );

    let rule = parent.recurrence.clone().unwrap();
    assert_eq!(compute_recurrence_end(&rule, parent.anchor()).unwrap(), None);
    assert_eq!(refresh(&mut parent).unwrap(), None);
}

/// ## Summary
/// A never-ending rule cannot be enumerated without a window end.
#[test]
fn forever_rule_without_window_end_is_a_configuration_error() {
    let rule = RecurrenceRule::new(Frequency::Daily).with_forever();
    let err = RuleClock::new(&rule, june(1, 9, 0))
        .generate(Some(june(1, 0, 0)), None)
        .unwrap_err();
    assert!(matches!(err, EngineError::Configuration(_)));
}

/// ## Summary
/// The boundary of a MO/WE/FR series is the last Friday before `until`, plus a day.
#[test]
fn boundary_of_a_four_week_series() {
    let rule = RecurrenceRule::new(Frequency::Weekly)
        .with_by_day([DayToken::MO, DayToken::WE, DayToken::FR])
        .with_until(at(2017, 7, 3, 0, 0));
    let end = compute_recurrence_end(&rule, june(5, 10, 0)).unwrap();
    assert_eq!(end, Some(at(2017, 7, 1, 10, 0)));
}

/// ## Summary
/// Merging an empty exception set reproduces the parent-filled occurrences.
#[test]
fn overlay_without_exceptions_is_identity() {
    let parent = study_series();
    let week = window(june(12, 0, 0), june(19, 0, 0));
    let occurrences = RuleClock::for_event(&parent)
        .unwrap()
        .generate(Some(week.start()), Some(week.end()))
        .unwrap();

    let merged = OverlayMerger::for_event(&parent).merge(occurrences.clone(), &week);
    assert_eq!(merged.len(), occurrences.len());
    for (instance, slot) in merged.iter().zip(&occurrences) {
        assert_eq!(instance.details, parent.details.at_slot(*slot));
    }
}

/// ## Summary
/// Promoting an unedited preview stores no overrides, and parent edits still reach it.
#[test_log::test]
fn promoting_an_unedited_preview_stores_nothing() {
    let mut parent = study_series();
    let preview = materialize_one(&parent, june(6, 19, 0)).unwrap().unwrap();
    assert_eq!(
        preview.identity,
        InstanceIdentity::Preview {
            rec_id: june(6, 19, 0)
        }
    );

    let d = preview.details;
    let id = create_exception(
        &mut parent,
        june(6, 19, 0),
        EventOverrides {
            title: Some(d.title),
            location: d.location,
            description: d.description,
            start: Some(d.start),
            end: d.end,
            labels: Some(d.labels),
            url: d.url,
            email: d.email,
            all_day: Some(d.all_day),
        },
    )
    .unwrap();

    let stored = parent
        .exceptions
        .iter()
        .find(|exception| exception.id() == id)
        .unwrap();
    assert!(stored.overrides.is_empty());

    parent.details.location = Some("Student center".into());
    let promoted = materialize_one(&parent, june(6, 19, 0)).unwrap().unwrap();
    assert_eq!(promoted.exception_id(), Some(id));
    assert_eq!(promoted.details.location.as_deref(), Some("Student center"));
}

/// ## Summary
/// An occurrence moved into a later window shows only there, never in its original slot's window.
#[test]
fn occurrence_moved_across_weeks() {
    let parent = study_series().with_exception(Exception::new(
        june(2, 19, 0),
        EventOverrides {
            start: Some(june(10, 10, 0)),
            ..EventOverrides::default()
        },
    ));

    let second_week = materialize(&parent, &window(june(8, 0, 0), june(15, 0, 0))).unwrap();
    assert!(starts(&second_week).contains(&june(10, 10, 0)));
    assert_eq!(second_week.len(), 6);

    let first_days = materialize(&parent, &window(june(2, 0, 0), june(3, 0, 0))).unwrap();
    assert!(first_days.is_empty());

    let moved_id = second_week
        .iter()
        .find(|instance| instance.start() == june(10, 10, 0))
        .and_then(VirtualInstance::exception_id)
        .unwrap();
    let across_june = materialize(&parent, &window(june(1, 0, 0), june(30, 0, 0))).unwrap();
    assert_eq!(
        across_june
            .iter()
            .filter(|instance| instance.exception_id() == Some(moved_id))
            .count(),
        1
    );
}

/// ## Summary
/// Recomputing the boundary after an edit is idempotent.
#[test]
fn boundary_refresh_is_idempotent() {
    let mut parent = study_series();
    let first = refresh(&mut parent).unwrap();
    let second = refresh(&mut parent).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, Some(at(2017, 7, 29, 19, 0)));
}
