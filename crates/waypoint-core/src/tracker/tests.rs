//! Tests for the stage tracker.

use jiff::{
    civil::{date, Date},
    tz::TimeZone,
    SignedDuration, Timestamp,
};

use super::*;
use crate::models::{Plan, Stage, Substage};

fn midnight(d: Date) -> Timestamp {
    d.to_zoned(TimeZone::UTC).unwrap().timestamp()
}

fn at(y: i16, m: i8, d: i8, hour: i8) -> Timestamp {
    date(y, m, d)
        .at(hour, 0, 0, 0)
        .to_zoned(TimeZone::UTC)
        .unwrap()
        .timestamp()
}

fn leaf(label: &str, due: Option<Date>) -> Stage {
    Stage {
        label: label.to_string(),
        description: format!("{label} description"),
        due,
        substages: vec![],
    }
}

fn plan_with(dues: &[Date]) -> Plan {
    Plan {
        goal: "Test goal".to_string(),
        stages: dues
            .iter()
            .enumerate()
            .map(|(i, due)| leaf(&format!("Stage {}", i + 1), Some(*due)))
            .collect(),
    }
}

fn tracker() -> StageTracker {
    StageTracker::default()
}

fn started(dues: &[Date]) -> (Plan, UserTask) {
    let plan = plan_with(dues);
    let task = tracker().start(1, &plan).unwrap();
    (plan, task)
}

fn assert_non_decreasing(task: &UserTask) {
    assert!(
        task.deadlines.windows(2).all(|pair| pair[0] <= pair[1]),
        "deadlines decreased: {:?}",
        task.deadlines
    );
    assert!(task.current_step <= task.deadlines.len());
}

#[test]
fn test_start_places_deadlines_at_start_of_day() {
    let (_, task) = started(&[date(2024, 1, 5), date(2024, 1, 8)]);

    assert_eq!(task.current_step, 0);
    assert_eq!(task.deadlines, vec![midnight(date(2024, 1, 5)), midnight(date(2024, 1, 8))]);
    assert_eq!(task.current_deadline, Some(midnight(date(2024, 1, 5))));
}

#[test]
fn test_start_rejects_missing_due_date() {
    let plan = Plan {
        goal: "g".to_string(),
        stages: vec![leaf("A", Some(date(2024, 1, 5))), leaf("B", None)],
    };
    let err = tracker().start(1, &plan).unwrap_err();
    assert!(matches!(err, CoachError::Validation { .. }));
}

#[test]
fn test_start_rejects_empty_plan_and_decreasing_dates() {
    let empty = Plan {
        goal: "g".to_string(),
        stages: vec![],
    };
    assert!(matches!(
        tracker().start(1, &empty),
        Err(CoachError::Validation { .. })
    ));

    let backwards = plan_with(&[date(2024, 1, 8), date(2024, 1, 5)]);
    assert!(matches!(
        tracker().start(1, &backwards),
        Err(CoachError::Validation { .. })
    ));
}

#[test]
fn test_start_uses_policy_timezone() {
    let tz = TimeZone::fixed(jiff::tz::offset(3));
    let tracker = StageTracker::new(TrackerPolicy::with_timezone(tz));
    let task = tracker.start(1, &plan_with(&[date(2024, 1, 5)])).unwrap();

    // Midnight at UTC+3 is 21:00 UTC the previous day.
    assert_eq!(task.deadlines[0], at(2024, 1, 4, 21));
    assert_eq!(tracker.local_date(task.deadlines[0]), date(2024, 1, 5));
}

#[test]
fn test_current_task_resolves_substages() {
    let plan = Plan {
        goal: "g".to_string(),
        stages: vec![
            Stage {
                label: "Week 1".to_string(),
                description: "First week".to_string(),
                due: None,
                substages: vec![
                    Substage {
                        label: "Day 1".to_string(),
                        description: "Warm up".to_string(),
                        due: Some(date(2024, 1, 2)),
                    },
                    Substage {
                        label: "Day 2".to_string(),
                        description: "Practice".to_string(),
                        due: Some(date(2024, 1, 3)),
                    },
                ],
            },
            leaf("Week 2", Some(date(2024, 1, 10))),
        ],
    };
    let mut task = tracker().start(1, &plan).unwrap();
    task.current_step = 1;
    task.sync_current_deadline();

    let CurrentTask::Active(view) = tracker().current_task(&task, &plan).unwrap() else {
        panic!("expected an active task");
    };
    assert_eq!(view.step, 1);
    assert_eq!(view.total, 3);
    assert_eq!(view.stage_index, 0);
    assert_eq!(view.stage_label, "Week 1");
    assert_eq!(view.label(), "Day 2");
    assert_eq!(view.description, "Practice");
    assert_eq!(view.deadline, midnight(date(2024, 1, 3)));
}

#[test]
fn test_current_task_signals_completion_and_mismatch() {
    let (plan, task) = started(&[date(2024, 1, 5)]);
    let (done, _) = tracker().mark_completed(&task, at(2024, 1, 5, 10)).unwrap();
    assert_eq!(
        tracker().current_task(&done, &plan).unwrap(),
        CurrentTask::Completed
    );

    let other = plan_with(&[date(2024, 1, 5), date(2024, 1, 6)]);
    assert!(matches!(
        tracker().current_task(&task, &other),
        Err(CoachError::Validation { .. })
    ));
    assert!(matches!(
        tracker().current_task(&UserTask::empty(9), &plan),
        Err(CoachError::NoPlan { user_id: 9 })
    ));
}

#[test]
fn test_late_completion_shifts_tail() {
    let (_, task) = started(&[date(2024, 1, 5), date(2024, 1, 8), date(2024, 1, 12)]);

    let (next, transition) = tracker()
        .mark_completed(&task, midnight(date(2024, 1, 7)))
        .unwrap();

    assert_eq!(transition, Transition::Advanced { step: 1 });
    assert_eq!(next.current_step, 1);
    assert_eq!(next.deadlines[1], midnight(date(2024, 1, 11)));
    assert_eq!(next.deadlines[2], midnight(date(2024, 1, 15)));
    assert_eq!(next.current_deadline, Some(midnight(date(2024, 1, 11))));
}

#[test]
fn test_completion_preserves_spacing() {
    let (_, task) = started(&[date(2024, 3, 1), date(2024, 3, 4), date(2024, 3, 11)]);
    let first_gap = task.deadlines[1].duration_since(task.deadlines[0]);
    let gap = task.deadlines[2].duration_since(task.deadlines[1]);

    for now in [at(2024, 2, 27, 9), at(2024, 3, 1, 18), at(2024, 3, 9, 7)] {
        let (next, _) = tracker().mark_completed(&task, now).unwrap();
        assert_eq!(next.deadlines[2].duration_since(next.deadlines[1]), gap);
        assert_eq!(
            next.deadlines[1],
            now + first_gap + SignedDuration::from_hours(24)
        );
        assert_non_decreasing(&next);
    }
}

#[test]
fn test_early_completion_keeps_deadlines_ordered() {
    let (_, task) = started(&[date(2024, 1, 10), date(2024, 1, 10), date(2024, 1, 11)]);
    let now = at(2024, 1, 2, 8);

    let (next, _) = tracker().mark_completed(&task, now).unwrap();

    assert_eq!(next.deadlines[0], now);
    assert_eq!(next.deadlines[1], at(2024, 1, 3, 8));
    assert_eq!(next.deadlines[2], at(2024, 1, 4, 8));
    assert_non_decreasing(&next);
}

#[test]
fn test_single_task_plan_completes_in_place() {
    let (_, task) = started(&[date(2024, 1, 5)]);
    let now = at(2024, 1, 5, 12);

    let (next, transition) = tracker().mark_completed(&task, now).unwrap();

    assert_eq!(transition, Transition::Finished);
    assert_eq!(next.current_step, 0);
    assert_eq!(next.deadlines, task.deadlines);
    assert_eq!(next.completed_at, Some(now));
    assert!(next.is_complete());
}

#[test]
fn test_completed_task_rejects_further_transitions() {
    let (_, task) = started(&[date(2024, 1, 5)]);
    let now = at(2024, 1, 6, 12);
    let (done, _) = tracker().mark_completed(&task, now).unwrap();

    assert!(matches!(
        tracker().mark_completed(&done, now),
        Err(CoachError::AlreadyComplete)
    ));
    assert!(matches!(
        tracker().postpone_default(&done, now),
        Err(CoachError::AlreadyComplete)
    ));
    assert!(!tracker().is_past_due(&done, now));
}

#[test]
fn test_postpone_shifts_from_current_step() {
    let (_, task) = started(&[date(2024, 2, 1), date(2024, 2, 4)]);
    let offset = SignedDuration::from_hours(48);

    let next = tracker()
        .postpone(&task, midnight(date(2024, 2, 2)), offset)
        .unwrap();

    assert_eq!(next.current_step, 0);
    assert_eq!(next.deadlines, vec![midnight(date(2024, 2, 3)), midnight(date(2024, 2, 6))]);
    assert_eq!(next.current_deadline, Some(midnight(date(2024, 2, 3))));
}

#[test]
fn test_postpone_leaves_completed_prefix_untouched() {
    let (_, task) = started(&[date(2024, 2, 1), date(2024, 2, 4), date(2024, 2, 6)]);
    let (task, _) = tracker().mark_completed(&task, at(2024, 2, 1, 9)).unwrap();
    let now = task.deadlines[1] + SignedDuration::from_hours(1);

    let next = tracker().postpone_default(&task, now).unwrap();

    assert_eq!(next.deadlines[0], task.deadlines[0]);
    assert_eq!(next.deadlines[1], task.deadlines[1] + SignedDuration::from_hours(48));
    assert_eq!(next.deadlines[2], task.deadlines[2] + SignedDuration::from_hours(48));
}

#[test]
fn test_postpone_before_deadline_is_rejected() {
    let (_, task) = started(&[date(2024, 2, 1), date(2024, 2, 4)]);
    let before = at(2024, 1, 31, 23);

    let err = tracker().postpone_default(&task, before).unwrap_err();
    assert!(matches!(err, CoachError::Precondition { .. }));

    let err = tracker()
        .postpone(&task, at(2024, 2, 2, 0), SignedDuration::ZERO)
        .unwrap_err();
    assert!(matches!(err, CoachError::Validation { .. }));
}

#[test]
fn test_past_due_and_overdue_use_calendar_days() {
    let (_, task) = started(&[date(2024, 2, 1), date(2024, 2, 4)]);

    assert!(!tracker().is_past_due(&task, at(2024, 1, 31, 23)));
    assert!(tracker().is_past_due(&task, at(2024, 2, 1, 0)));
    assert!(tracker().is_past_due(&task, at(2024, 2, 1, 23)));
    assert!(!tracker().is_overdue(&task, at(2024, 2, 1, 23)));
    assert!(tracker().is_overdue(&task, at(2024, 2, 2, 0)));
    assert!(!tracker().is_past_due(&UserTask::empty(1), at(2024, 2, 2, 0)));
}

#[test]
fn test_mixed_sequences_keep_invariants() {
    let dues = [
        date(2024, 5, 1),
        date(2024, 5, 1),
        date(2024, 5, 3),
        date(2024, 5, 8),
        date(2024, 5, 9),
    ];
    let (_, mut task) = started(&dues);
    let mut now = at(2024, 4, 28, 10);

    // Alternate early completions, late completions and postponements.
    for round in 0..12 {
        now = now + SignedDuration::from_hours(13 * (round % 4 + 1));
        let result = if round % 3 == 2 {
            tracker().postpone_default(&task, now)
        } else {
            tracker().mark_completed(&task, now).map(|(next, _)| next)
        };
        match result {
            Ok(next) => task = next,
            Err(CoachError::Precondition { .. }) | Err(CoachError::AlreadyComplete) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
        assert_non_decreasing(&task);
        task.check_invariants().unwrap();
    }
    assert!(task.is_complete());
}
