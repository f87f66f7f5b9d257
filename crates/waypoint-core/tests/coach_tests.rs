mod common;

use common::{at, create_test_coach, midnight, sample_plan};
use jiff::{civil::date, SignedDuration};
use waypoint_core::{
    params::{SetAccess, UserId},
    CoachError, CurrentTask, Event, Progress, RecordingSink, Transition,
};

#[tokio::test]
async fn test_plan_lifecycle_with_substages() {
    let (_temp_dir, clock, coach) = create_test_coach(at(2024, 3, 1, 9)).await;
    let sink = RecordingSink::new();
    coach.register_user(10).await.unwrap();
    coach
        .set_access(&SetAccess { id: 10, access: true })
        .await
        .unwrap();

    let task = coach.create_plan(10, sample_plan()).await.unwrap();
    assert_eq!(task.total(), 4);
    assert_eq!(task.progress(), Progress::InProgress { step: 0, total: 4 });

    // Sources finished a day late: March 5 instead of March 4.
    clock.set(midnight(date(2024, 3, 5)));
    let completion = coach.complete_current(10, &sink).await.unwrap();
    assert_eq!(completion.transition, Transition::Advanced { step: 1 });
    let CurrentTask::Active(view) = &completion.next else {
        panic!("expected the outline task");
    };
    assert_eq!(view.stage_label, "Research");
    assert_eq!(view.label(), "Outline");
    assert_eq!(
        completion.task.deadlines[1..],
        [
            midnight(date(2024, 3, 8)),
            midnight(date(2024, 3, 12)),
            midnight(date(2024, 3, 17)),
        ]
    );

    // Outline due March 8; a reminder goes out that day at noon.
    clock.set(at(2024, 3, 8, 12));
    let report = coach.run_sweeps(&sink).await.unwrap();
    assert_eq!(report.reminded, 1);
    assert_eq!(report.postponed, 0);

    let completion = coach.confirm_due_completion(10, &sink).await.unwrap();
    let CurrentTask::Active(view) = &completion.next else {
        panic!("expected the slides task");
    };
    assert_eq!(view.label(), "Slides");

    for _ in 0..2 {
        clock.advance(SignedDuration::from_hours(24));
        coach.complete_current(10, &sink).await.unwrap();
    }

    let status = coach.user_status(&UserId { id: 10 }).await.unwrap();
    assert_eq!(status.task.progress(), Progress::Completed { total: 4 });
    assert_eq!(status.current, Some(CurrentTask::Completed));
    assert!(sink
        .events()
        .iter()
        .any(|(id, event)| *id == 10 && *event == Event::PlanCompleted));

    // Finished plans get neither reminders nor postponements.
    clock.advance(SignedDuration::from_hours(24 * 10));
    let report = coach.run_sweeps(&sink).await.unwrap();
    assert_eq!(report.reminded + report.postponed + report.nudged, 0);
}

#[tokio::test]
async fn test_concurrent_completions_each_advance_once() {
    let (_temp_dir, _clock, coach) = create_test_coach(at(2024, 3, 1, 9)).await;
    coach.register_user(20).await.unwrap();
    coach.create_plan(20, sample_plan()).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..3 {
        let coach = coach.clone();
        handles.push(tokio::spawn(async move {
            coach
                .complete_current(20, &waypoint_core::LogSink)
                .await
                .map(|completion| completion.transition)
        }));
    }
    let mut steps = Vec::new();
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            Transition::Advanced { step } => steps.push(step),
            Transition::Finished => panic!("plan has four tasks"),
        }
    }
    steps.sort_unstable();
    assert_eq!(steps, vec![1, 2, 3]);

    let snapshot = coach.current_task(20).await.unwrap();
    assert_eq!(snapshot.task.current_step, 3);
    snapshot.task.check_invariants().unwrap();
}

#[tokio::test]
async fn test_deadlines_stay_ordered_across_days_of_sweeps() {
    let (_temp_dir, clock, coach) = create_test_coach(at(2024, 3, 1, 9)).await;
    let sink = RecordingSink::new();
    coach.register_user(30).await.unwrap();
    coach
        .set_access(&SetAccess { id: 30, access: true })
        .await
        .unwrap();
    coach.create_plan(30, sample_plan()).await.unwrap();

    // The user ignores the bot for two weeks while sweeps run every six hours.
    for _ in 0..(14 * 4) {
        clock.advance(SignedDuration::from_hours(6));
        coach.run_sweeps(&sink).await.unwrap();
        let task = coach.current_task(30).await.unwrap().task;
        task.check_invariants().unwrap();
        assert_eq!(task.current_step, 0);
    }

    let events = sink.events();
    let reminders = events
        .iter()
        .filter(|(_, event)| matches!(event, Event::ReminderDue { .. }))
        .count();
    let postponements = events
        .iter()
        .filter(|(_, event)| matches!(event, Event::DeadlinePassed { .. }))
        .count();
    assert!(reminders > 0);
    assert!(postponements > 0);
    // Never more than one reminder and one postponement per local day.
    assert!(reminders <= 14);
    assert!(postponements <= 14);

    // The current deadline is never left in the past after a sweep day.
    let task = coach.current_task(30).await.unwrap().task;
    assert!(!coach.tracker().is_overdue(&task, coach.now()));
}

#[tokio::test]
async fn test_reset_allows_a_new_plan() {
    let (_temp_dir, clock, coach) = create_test_coach(at(2024, 3, 1, 9)).await;
    coach.register_user(40).await.unwrap();
    coach.create_plan(40, sample_plan()).await.unwrap();
    coach.complete_current(40, &waypoint_core::LogSink).await.unwrap();

    coach.reset_user(&UserId { id: 40 }).await.unwrap();
    assert!(matches!(
        coach.current_task(40).await,
        Err(CoachError::NoPlan { user_id: 40 })
    ));
    assert!(matches!(
        coach.complete_current(40, &waypoint_core::LogSink).await,
        Err(CoachError::NoPlan { user_id: 40 })
    ));

    clock.advance(SignedDuration::from_hours(24));
    let task = coach.create_plan(40, sample_plan()).await.unwrap();
    assert_eq!(task.current_step, 0);
    assert_eq!(task.deadlines[0], midnight(date(2024, 3, 4)));
}

#[tokio::test]
async fn test_unknown_users_are_reported() {
    let (_temp_dir, _clock, coach) = create_test_coach(at(2024, 3, 1, 9)).await;

    assert!(matches!(
        coach.current_task(404).await,
        Err(CoachError::UserNotFound { id: 404 })
    ));
    assert!(matches!(
        coach.create_plan(404, sample_plan()).await,
        Err(CoachError::UserNotFound { id: 404 })
    ));
    assert!(matches!(
        coach.reset_user(&UserId { id: 404 }).await,
        Err(CoachError::UserNotFound { id: 404 })
    ));
    assert!(!coach.delete_user(&UserId { id: 404 }).await.unwrap());
}
