// ABOUTME: Integration tests for SQLite program storage
// ABOUTME: Verifies aggregate round-trips, duplicate rejection, listing, and deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{streamed_phase_json, test_database};
use pierre_program_engine::database::ProgramStore;
use pierre_program_engine::generation::types::{
    GeneratedPhase, GeneratedProgram, MeasureType, Program,
};

fn sample_program(user_id: &str) -> Program {
    let phases: Vec<GeneratedPhase> = (1..=2)
        .map(|n| serde_json::from_str(&streamed_phase_json(n)).expect("phase fixture must parse"))
        .collect();

    Program::from_generated(
        GeneratedProgram {
            name: "Strength Builder".to_owned(),
            description: "A progressive strength program".to_owned(),
            total_weeks: 8,
            phases,
        },
        user_id,
    )
}

#[tokio::test]
async fn test_round_trip_preserves_aggregate() {
    let (database, _dir) = test_database().await;
    let store = ProgramStore::new(database.pool().clone());

    let program = sample_program("user-1");
    let saved = store.create_program(&program).await.unwrap();
    assert_eq!(saved.id, program.id);
    assert_eq!(saved.name, "Strength Builder");

    let stored = store.get_program(&program.id).await.unwrap().unwrap();
    assert_eq!(stored.created_for, "user-1");
    assert_eq!(stored.total_weeks, 8);
    assert_eq!(stored.phases.len(), 2);

    let phase = &stored.phases[0];
    assert_eq!(phase.phase_number, 1);
    assert_eq!(phase.duration_weeks, 4);
    assert_eq!(phase.key_points, vec!["Be consistent".to_owned()]);
    assert_eq!(phase.nutrition.daily_calories, 2400);
    assert_eq!(phase.nutrition.macros.protein, 180);

    let workout = &phase.workouts[0];
    assert_eq!(workout.day_number, 1);
    assert_eq!(workout.warmup.duration, 10);
    assert_eq!(workout.exercises.len(), 2);

    // Exercise order and measure survive the round trip
    let squat = &workout.exercises[0];
    assert_eq!(squat.name, "Back Squat");
    assert_eq!(squat.sets, 4);
    assert_eq!(squat.measure.measure_type, MeasureType::Reps);
    assert!((squat.measure.value - 6.0).abs() < f64::EPSILON);
    assert_eq!(workout.exercises[1].name, "Leg Curl");
}

#[tokio::test]
async fn test_duplicate_program_id_is_rejected() {
    let (database, _dir) = test_database().await;
    let store = ProgramStore::new(database.pool().clone());

    let program = sample_program("user-1");
    store.create_program(&program).await.unwrap();

    let err = store
        .create_program(&program)
        .await
        .expect_err("duplicate id must fail");
    assert!(err.to_string().contains("Failed to insert program"));

    // The failed transaction left the original intact and nothing extra
    let programs = store.list_programs("user-1").await.unwrap();
    assert_eq!(programs.len(), 1);
}

#[tokio::test]
async fn test_list_programs_is_scoped_to_user() {
    let (database, _dir) = test_database().await;
    let store = ProgramStore::new(database.pool().clone());

    store.create_program(&sample_program("user-a")).await.unwrap();
    store.create_program(&sample_program("user-a")).await.unwrap();
    store.create_program(&sample_program("user-b")).await.unwrap();

    let for_a = store.list_programs("user-a").await.unwrap();
    assert_eq!(for_a.len(), 2);
    assert!(for_a.iter().all(|p| p.phase_count == 2));

    let for_b = store.list_programs("user-b").await.unwrap();
    assert_eq!(for_b.len(), 1);

    let for_nobody = store.list_programs("user-c").await.unwrap();
    assert!(for_nobody.is_empty());
}

#[tokio::test]
async fn test_get_missing_program_returns_none() {
    let (database, _dir) = test_database().await;
    let store = ProgramStore::new(database.pool().clone());

    let found = store.get_program("does-not-exist").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_delete_program_cascades() {
    let (database, _dir) = test_database().await;
    let store = ProgramStore::new(database.pool().clone());

    let program = sample_program("user-1");
    store.create_program(&program).await.unwrap();

    assert!(store.delete_program(&program.id).await.unwrap());
    assert!(store.get_program(&program.id).await.unwrap().is_none());

    // Deleting again reports nothing removed
    assert!(!store.delete_program(&program.id).await.unwrap());
}
