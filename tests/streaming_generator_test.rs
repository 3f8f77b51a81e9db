// ABOUTME: Integration tests for the streaming single-shot program generator
// ABOUTME: Verifies progress monotonicity, terminal events, and single persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{streamed_meta_json, streamed_phase_json, test_database, ScriptedProvider};
use pierre_program_engine::config::GenerationConfig;
use pierre_program_engine::database::ProgramStore;
use pierre_program_engine::generation::types::{
    intake_to_profile, ExperienceLevel, ProgramIntake, UserProfile,
};
use pierre_program_engine::generation::{GenerationEvent, SingleShotProgramGenerator};
use tokio::sync::mpsc::UnboundedReceiver;

fn intermediate_profile() -> UserProfile {
    let intake = ProgramIntake {
        training_goal: Some("build muscle".to_owned()),
        days_available: Some(4),
        experience_level: Some(ExperienceLevel::Intermediate),
        ..ProgramIntake::default()
    };
    intake_to_profile(&intake)
}

fn streaming_generator(chunks: Vec<String>) -> Arc<SingleShotProgramGenerator> {
    Arc::new(SingleShotProgramGenerator::new(
        Arc::new(ScriptedProvider::with_stream(chunks)),
        GenerationConfig::default(),
    ))
}

async fn collect_events(mut rx: UnboundedReceiver<GenerationEvent>) -> Vec<GenerationEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn two_phase_stream() -> Vec<String> {
    let phase_one = streamed_phase_json(1);
    let (head, tail) = phase_one.split_at(phase_one.len() / 2);
    vec![
        // First phase split across deltas to exercise buffering
        head.to_owned(),
        format!("{tail}\n@@PHASE_END@@\n"),
        format!("{}\n@@PHASE_END@@\n@@PROGRAM_META@@\n", streamed_phase_json(2)),
        streamed_meta_json(8),
    ]
}

// =============================================================================
// Success Path
// =============================================================================

#[tokio::test]
async fn test_successful_run_emits_monotonic_progress_and_one_complete() {
    let (database, _dir) = test_database().await;
    let store = ProgramStore::new(database.pool().clone());

    let rx = streaming_generator(two_phase_stream()).stream_generation(
        intermediate_profile(),
        None,
        "user-123".to_owned(),
        store.clone(),
    );
    let events = collect_events(rx).await;

    let mut last_progress = 0;
    let mut completes = 0;
    let mut errors = 0;
    let mut phases_seen = 0;
    for event in &events {
        match event {
            GenerationEvent::Progress { progress, .. } => {
                assert!(*progress >= last_progress, "progress went backwards");
                last_progress = *progress;
            }
            GenerationEvent::Complete { .. } => completes += 1,
            GenerationEvent::Error { .. } => errors += 1,
            GenerationEvent::Phase { .. } => phases_seen += 1,
            GenerationEvent::ProgramMeta { .. } => {}
        }
    }

    assert_eq!(completes, 1);
    assert_eq!(errors, 0);
    assert_eq!(phases_seen, 2);
    assert_eq!(last_progress, 100);
    assert!(
        matches!(events.last(), Some(GenerationEvent::Complete { .. })),
        "complete must be the final event"
    );
}

#[tokio::test]
async fn test_successful_run_persists_exactly_one_program() {
    let (database, _dir) = test_database().await;
    let store = ProgramStore::new(database.pool().clone());

    let rx = streaming_generator(two_phase_stream()).stream_generation(
        intermediate_profile(),
        None,
        "user-123".to_owned(),
        store.clone(),
    );
    let events = collect_events(rx).await;

    let saved = events
        .iter()
        .find_map(|e| match e {
            GenerationEvent::Complete { saved, .. } => Some(saved.clone()),
            _ => None,
        })
        .expect("missing complete event");

    let programs = store.list_programs("user-123").await.unwrap();
    assert_eq!(programs.len(), 1);
    assert_eq!(programs[0].id, saved.id);

    let stored = store.get_program(&saved.id).await.unwrap().unwrap();
    assert_eq!(stored.phases.len(), 2);
    assert_eq!(stored.name, "Strength Builder");
    assert_eq!(stored.created_for, "user-123");
}

#[tokio::test]
async fn test_meta_fallback_when_model_omits_metadata() {
    let (database, _dir) = test_database().await;
    let store = ProgramStore::new(database.pool().clone());

    let chunks = vec![
        format!("{}\n@@PHASE_END@@\n", streamed_phase_json(1)),
        format!("{}\n@@PHASE_END@@\n", streamed_phase_json(2)),
    ];
    let rx = streaming_generator(chunks).stream_generation(
        intermediate_profile(),
        None,
        "user-123".to_owned(),
        store.clone(),
    );
    let events = collect_events(rx).await;

    let program = events
        .iter()
        .find_map(|e| match e {
            GenerationEvent::Complete { program, .. } => Some(program.clone()),
            _ => None,
        })
        .expect("missing complete event");

    assert_eq!(program.name, "Custom Fitness Program");
    // Fallback total is the sum of phase durations
    assert_eq!(program.total_weeks, 8);
}

#[tokio::test]
async fn test_invalid_phase_segments_are_skipped() {
    let (database, _dir) = test_database().await;
    let store = ProgramStore::new(database.pool().clone());

    let chunks = vec![
        "this segment is not json\n@@PHASE_END@@\n".to_owned(),
        format!("{}\n@@PHASE_END@@\n@@PROGRAM_META@@\n", streamed_phase_json(1)),
        streamed_meta_json(4),
    ];
    let rx = streaming_generator(chunks).stream_generation(
        intermediate_profile(),
        None,
        "user-123".to_owned(),
        store,
    );
    let events = collect_events(rx).await;

    let program = events
        .iter()
        .find_map(|e| match e {
            GenerationEvent::Complete { program, .. } => Some(program.clone()),
            _ => None,
        })
        .expect("missing complete event");

    assert_eq!(program.phases.len(), 1);
}

// =============================================================================
// Failure Path
// =============================================================================

#[tokio::test]
async fn test_zero_phases_emits_single_error_and_persists_nothing() {
    let (database, _dir) = test_database().await;
    let store = ProgramStore::new(database.pool().clone());

    let chunks = vec!["no delimiters, no phases, just prose".to_owned()];
    let rx = streaming_generator(chunks).stream_generation(
        intermediate_profile(),
        None,
        "user-123".to_owned(),
        store.clone(),
    );
    let events = collect_events(rx).await;

    let errors: Vec<&GenerationEvent> = events
        .iter()
        .filter(|e| matches!(e, GenerationEvent::Error { .. }))
        .collect();
    assert_eq!(errors.len(), 1);
    if let GenerationEvent::Error { message } = errors[0] {
        assert!(message.contains("No phases were generated"));
    }
    assert!(
        !events.iter().any(|e| matches!(e, GenerationEvent::Complete { .. })),
        "error and complete are mutually exclusive"
    );

    let programs = store.list_programs("user-123").await.unwrap();
    assert!(programs.is_empty());
}

// =============================================================================
// Disconnect Semantics
// =============================================================================

#[tokio::test]
async fn test_generation_survives_dropped_receiver() {
    let (database, _dir) = test_database().await;
    let store = ProgramStore::new(database.pool().clone());

    let rx = streaming_generator(two_phase_stream()).stream_generation(
        intermediate_profile(),
        None,
        "user-123".to_owned(),
        store.clone(),
    );
    // Client goes away immediately; the run must still finish and persist
    drop(rx);

    let mut programs = Vec::new();
    for _ in 0..200 {
        programs = store.list_programs("user-123").await.unwrap();
        if !programs.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(programs.len(), 1);
}
