#![allow(dead_code)]

use std::sync::Arc;

use jiff::{
    civil::{date, Date},
    tz::TimeZone,
    Timestamp,
};
use tempfile::TempDir;
use waypoint_core::{
    models::{Plan, Stage, Substage},
    Coach, CoachBuilder, ManualClock,
};

/// Start of `day` in UTC.
pub fn midnight(day: Date) -> Timestamp {
    day.to_zoned(TimeZone::UTC)
        .expect("Failed to place date in UTC")
        .timestamp()
}

/// `hour` o'clock on the given UTC day.
pub fn at(y: i16, m: i8, d: i8, hour: i8) -> Timestamp {
    date(y, m, d)
        .at(hour, 0, 0, 0)
        .to_zoned(TimeZone::UTC)
        .expect("Failed to place datetime in UTC")
        .timestamp()
}

/// A plan with one split stage and two plain ones: four tasks due on
/// March 4, 6, 10 and 15 of 2024.
pub fn sample_plan() -> Plan {
    Plan {
        goal: "Prepare a conference talk".to_string(),
        stages: vec![
            Stage {
                label: "Research".to_string(),
                description: "Collect material".to_string(),
                due: None,
                substages: vec![
                    Substage {
                        label: "Sources".to_string(),
                        description: "Find five references".to_string(),
                        due: Some(date(2024, 3, 4)),
                    },
                    Substage {
                        label: "Outline".to_string(),
                        description: "Write the outline".to_string(),
                        due: Some(date(2024, 3, 6)),
                    },
                ],
            },
            Stage {
                label: "Slides".to_string(),
                description: "Build the deck".to_string(),
                due: Some(date(2024, 3, 10)),
                substages: vec![],
            },
            Stage {
                label: "Rehearsal".to_string(),
                description: "Give the talk to a friend".to_string(),
                due: Some(date(2024, 3, 15)),
                substages: vec![],
            },
        ],
    }
}

/// Helper function to create a test coach on a manual clock
pub async fn create_test_coach(now: Timestamp) -> (TempDir, Arc<ManualClock>, Coach) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let clock = Arc::new(ManualClock::new(now));
    let coach = CoachBuilder::new()
        .with_database_path(Some(&db_path))
        .with_clock(clock.clone())
        .build()
        .await
        .expect("Failed to create coach");
    (temp_dir, clock, coach)
}
