#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Editing a series through its exceptions, then reading it back.

use cadence_test::component::engine::edit::{
    EditTarget, create_exception, delete_occurrence, find_exception, replace_rule,
    update_exception,
};
use cadence_test::component::engine::{EngineError, materialize, materialize_one};
use cadence_test::component::event::{EventOverrides, InstanceIdentity};
use cadence_test::component::rule::RecurrenceRule;
use cadence_test::component::types::{DayToken, Frequency};

use super::helpers::*;

/// ## Summary
/// Create, update and delete one occurrence, checking the week after each step.
#[test_log::test]
fn create_update_delete_round() {
    let mut parent = study_series();
    let week = window(june(5, 0, 0), june(12, 0, 0));

    let id = create_exception(
        &mut parent,
        june(6, 19, 0),
        EventOverrides {
            location: Some("Room 101".into()),
            ..EventOverrides::default()
        },
    )
    .unwrap();
    let instances = materialize(&parent, &week).unwrap();
    assert_eq!(instances.len(), 5);
    let edited = instances
        .iter()
        .find(|instance| instance.exception_id() == Some(id))
        .unwrap();
    assert_eq!(edited.details.location.as_deref(), Some("Room 101"));
    assert_eq!(edited.start(), june(6, 19, 0));

    update_exception(
        &mut parent,
        id,
        EventOverrides {
            start: Some(june(6, 17, 0)),
            title: Some("Early study".into()),
            ..EventOverrides::default()
        },
    )
    .unwrap();
    let stored = find_exception(&parent, id).unwrap();
    assert_eq!(stored.overrides.location.as_deref(), Some("Room 101"));
    assert_eq!(stored.effective_start(), june(6, 17, 0));

    let instances = materialize(&parent, &week).unwrap();
    assert_eq!(
        starts(&instances),
        vec![
            june(5, 19, 0),
            june(6, 17, 0),
            june(7, 19, 0),
            june(8, 19, 0),
            june(9, 19, 0),
        ]
    );
    assert_eq!(instances[1].details.end, Some(june(6, 19, 0)));
    assert_eq!(instances[1].details.title, "Early study");

    let deleted = delete_occurrence(&mut parent, EditTarget::Exception(id)).unwrap();
    assert_eq!(deleted, id);
    assert_eq!(parent.exceptions.len(), 1);
    assert_eq!(materialize(&parent, &week).unwrap().len(), 4);
    assert_eq!(materialize_one(&parent, june(6, 19, 0)).unwrap(), None);
}

/// ## Summary
/// Editing the same slot twice merges into one exception.
#[test]
fn second_edit_of_a_slot_merges() {
    let mut parent = study_series();
    let first = create_exception(
        &mut parent,
        june(7, 19, 0),
        EventOverrides {
            title: Some("Review".into()),
            ..EventOverrides::default()
        },
    )
    .unwrap();
    let second = create_exception(
        &mut parent,
        june(7, 19, 0),
        EventOverrides {
            description: Some("Chapter 4".into()),
            ..EventOverrides::default()
        },
    )
    .unwrap();

    assert_eq!(first, second);
    assert_eq!(parent.exceptions.len(), 1);
    let instance = materialize_one(&parent, june(7, 19, 0)).unwrap().unwrap();
    assert_eq!(instance.details.title, "Review");
    assert_eq!(instance.details.description.as_deref(), Some("Chapter 4"));
    assert_eq!(
        instance.identity,
        InstanceIdentity::Promoted {
            id: first,
            rec_id: june(7, 19, 0)
        }
    );
}

/// ## Summary
/// Slots the rule never produces cannot be edited or deleted.
#[test]
fn edits_outside_the_series_are_rejected() {
    let mut parent = study_series();
    let saturday = june(3, 19, 0);

    let err = create_exception(&mut parent, saturday, EventOverrides::default()).unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    let err = delete_occurrence(&mut parent, EditTarget::Slot(saturday)).unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    let err = update_exception(&mut parent, uuid::Uuid::new_v4(), EventOverrides::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert!(parent.exceptions.is_empty());
}

/// ## Summary
/// Deleting an unedited slot twice keeps a single deletion.
#[test]
fn deleting_a_slot_is_idempotent() {
    let mut parent = study_series();
    let first = delete_occurrence(&mut parent, EditTarget::Slot(june(9, 19, 0))).unwrap();
    let second = delete_occurrence(&mut parent, EditTarget::Slot(june(9, 19, 0))).unwrap();
    assert_eq!(first, second);
    assert_eq!(parent.exceptions.len(), 1);
    assert!(parent.exceptions[0].deleted);
}

/// ## Summary
/// A deleted occurrence stays deleted when an edit targets its slot.
#[test]
fn editing_a_deleted_slot_is_rejected() {
    let mut parent = study_series();
    delete_occurrence(&mut parent, EditTarget::Slot(june(8, 19, 0))).unwrap();

    let err = create_exception(
        &mut parent,
        june(8, 19, 0),
        EventOverrides {
            title: Some("Makeup session".into()),
            ..EventOverrides::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert_eq!(materialize_one(&parent, june(8, 19, 0)).unwrap(), None);
    assert_eq!(parent.exceptions.len(), 1);
}

/// ## Summary
/// Replacing the rule moves the boundary and keeps stored exceptions.
#[test_log::test]
fn replacing_the_rule_moves_the_boundary() {
    let mut parent = study_series();
    delete_occurrence(&mut parent, EditTarget::Slot(june(2, 19, 0))).unwrap();

    let end = replace_rule(
        &mut parent,
        Some(
            RecurrenceRule::new(Frequency::Weekly)
                .with_by_day([DayToken::TH])
                .with_count(3)
                .unwrap(),
        ),
    )
    .unwrap();
    assert_eq!(end, Some(june(16, 19, 0)));
    assert_eq!(parent.recurrence_end, end);
    assert_eq!(parent.exceptions.len(), 1);
    assert_eq!(
        starts(&materialize(&parent, &window(june(1, 0, 0), june(30, 0, 0))).unwrap()),
        vec![june(1, 19, 0), june(8, 19, 0), june(15, 19, 0)]
    );

    let end = replace_rule(
        &mut parent,
        Some(RecurrenceRule::new(Frequency::Daily).with_forever()),
    )
    .unwrap();
    assert_eq!(end, None);
    assert_eq!(parent.recurrence_end, None);

    assert_eq!(replace_rule(&mut parent, None).unwrap(), None);
    assert!(!parent.is_recurring());
}

/// ## Summary
/// An ambiguous rule is rejected and the parent keeps its old one.
#[test]
fn rejected_rule_leaves_the_parent_unchanged() {
    let mut parent = study_series();
    let before = parent.clone();
    let ambiguous = RecurrenceRule::new(Frequency::Daily)
        .with_count(3)
        .unwrap()
        .with_forever();

    let err = replace_rule(&mut parent, Some(ambiguous)).unwrap_err();
    assert!(matches!(err, EngineError::Configuration(_)));
    assert_eq!(parent, before);
}
