// ABOUTME: Shared test utilities for program engine integration tests
// ABOUTME: Provides a scripted LLM provider, database setup, and JSON fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

//! Shared test utilities for `pierre_program_engine`
//!
//! Provides a scripted in-memory LLM provider so generation tests can run
//! without a model endpoint, plus fixture JSON matching the step schemas.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use pierre_program_engine::config::{DatabaseConfig, DatabaseUrl};
use pierre_program_engine::database::Database;
use pierre_program_engine::errors::AppError;
use pierre_program_engine::llm::{
    ChatRequest, ChatResponse, ChatStream, LlmCapabilities, LlmProvider, StreamChunk, TokenUsage,
};

// =============================================================================
// Scripted Provider
// =============================================================================

/// LLM provider that replays scripted responses in order.
///
/// `complete` pops one response per call and fails once the script runs out,
/// which doubles as a way to simulate a provider outage mid-pipeline.
/// `complete_stream` replays the configured chunks as deltas.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
    stream_chunks: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            stream_chunks: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_stream(chunks: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            stream_chunks: Mutex::new(chunks),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `complete` and `complete_stream` calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted Test Provider"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::text_only()
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    fn available_models(&self) -> &'static [&'static str] {
        &["mock-model"]
    }

    async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        next.map_or_else(
            || {
                Err(AppError::external_service(
                    "llm",
                    "scripted provider has no responses left",
                ))
            },
            |content| {
                Ok(ChatResponse {
                    content,
                    model: "mock-model".to_owned(),
                    usage: Some(TokenUsage {
                        prompt_tokens: 50,
                        completion_tokens: 50,
                        total_tokens: 100,
                    }),
                    finish_reason: Some("stop".to_owned()),
                })
            },
        )
    }

    async fn complete_stream(&self, _request: &ChatRequest) -> Result<ChatStream, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let chunks = self.stream_chunks.lock().unwrap().clone();
        let mut items: Vec<Result<StreamChunk, AppError>> = chunks
            .into_iter()
            .map(|delta| {
                Ok(StreamChunk {
                    delta,
                    is_final: false,
                    finish_reason: None,
                })
            })
            .collect();
        items.push(Ok(StreamChunk {
            delta: String::new(),
            is_final: true,
            finish_reason: Some("stop".to_owned()),
        }));
        Ok(Box::pin(tokio_stream::iter(items)))
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

// =============================================================================
// Database Setup
// =============================================================================

/// Create a migrated file-backed database in a temporary directory.
///
/// The `TempDir` must stay alive for the lifetime of the database.
pub async fn test_database() -> (Database, TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("programs.db");
    let config = DatabaseConfig {
        url: DatabaseUrl::SQLite {
            path: path.to_string_lossy().into_owned(),
        },
        auto_migrate: true,
    };
    let database = Database::connect(&config)
        .await
        .expect("failed to connect to test database");
    (database, dir)
}

// =============================================================================
// Step Response Fixtures
// =============================================================================

/// Step 1 response: program structure with the given phase count
pub fn structure_json(phase_count: usize) -> String {
    let durations: Vec<String> = (0..phase_count).map(|_| "4".to_owned()).collect();
    let progression: Vec<String> = (1..=phase_count)
        .map(|n| format!("\"phase {n} emphasis\""))
        .collect();
    format!(
        r#"{{
          "programName": "Strength Builder",
          "programDescription": "A progressive strength program",
          "phaseCount": {phase_count},
          "phaseDurations": [{}],
          "phaseProgression": [{}],
          "overallGoals": ["add 20 lbs to the squat"]
        }}"#,
        durations.join(", "),
        progression.join(", ")
    )
}

/// Step 2 response: weekly workout structure
pub fn workout_structure_json() -> String {
    r#"{
      "daysPerWeek": 4,
      "sessionDuration": 60,
      "splitType": "Upper/Lower",
      "workoutDistribution": ["Upper A", "Lower A", "Upper B", "Lower B"],
      "exerciseSelectionRules": {
        "compoundToIsolationRatio": "2:1",
        "exercisesPerWorkout": 6,
        "restPeriods": {"default": 90},
        "setRanges": {"default": 3},
        "repRanges": {"default": 10}
      }
    }"#
    .to_owned()
}

/// Step 3 response: one phase of workouts (without phase-level nutrition,
/// so assembly falls back to the program-wide plan)
pub fn phase_workouts_json() -> String {
    format!(
        r#"{{
          "id": "phase-fixture",
          "workouts": [{}],
          "phaseExplanation": "Builds base strength",
          "phaseExpectations": "Steady weekly progress",
          "phaseKeyPoints": ["Track every lift"],
          "splitType": "Upper/Lower"
        }}"#,
        workout_json(1)
    )
}

/// Step 4 response: program-wide nutrition plan
pub fn nutrition_json(daily_calories: u32) -> String {
    format!(
        r#"{{
          "dailyCalories": {daily_calories},
          "macros": {{"protein": 180, "carbs": 250, "fats": 80}},
          "supplements": ["creatine"],
          "restrictions": []
        }}"#
    )
}

/// Step 5 response: the review verdict
pub fn review_json(is_complete: bool, is_safe: bool, meets_needs: bool, warnings: &[&str]) -> String {
    let warnings: Vec<String> = warnings.iter().map(|w| format!("\"{w}\"")).collect();
    format!(
        r#"{{
          "isComplete": {is_complete},
          "isSafe": {is_safe},
          "meetsClientNeeds": {meets_needs},
          "warnings": [{}],
          "suggestions": []
        }}"#,
        warnings.join(", ")
    )
}

/// One valid training day used inside phase fixtures
pub fn workout_json(day: u32) -> String {
    format!(
        r#"{{
          "dayNumber": {day},
          "name": "Day {day}",
          "focus": "full body strength",
          "warmup": {{"duration": 10, "activities": ["bike", "leg swings"]}},
          "cooldown": {{"duration": 5, "activities": ["stretching"]}},
          "exercises": [
            {{
              "name": "Back Squat",
              "sets": 4,
              "measure": {{"type": "reps", "value": 6}},
              "restPeriod": 180,
              "equipment": ["barbell"],
              "alternatives": ["Goblet Squat"],
              "category": "primary"
            }},
            {{
              "name": "Leg Curl",
              "sets": 3,
              "measure": {{"type": "reps", "value": 12}},
              "restPeriod": 90,
              "equipment": ["machine"],
              "alternatives": ["Nordic Curl"],
              "category": "isolation"
            }}
          ]
        }}"#
    )
}

/// One complete streamed phase document matching the phase schema
pub fn streamed_phase_json(phase_number: u32) -> String {
    format!(
        r#"{{
          "phaseNumber": {phase_number},
          "name": "Phase {phase_number}",
          "durationWeeks": 4,
          "focus": "strength",
          "explanation": "Build base strength",
          "expectations": "Steady progress",
          "keyPoints": ["Be consistent"],
          "splitType": "Upper/Lower",
          "workouts": [{}],
          "nutrition": {{
            "dailyCalories": 2400,
            "macros": {{"protein": 180, "carbs": 250, "fats": 80}}
          }},
          "progressionProtocol": ["Add weight weekly"]
        }}"#,
        workout_json(1)
    )
}

/// Streamed program metadata document
pub fn streamed_meta_json(total_weeks: u32) -> String {
    format!(
        r#"{{"name": "Strength Builder", "description": "A progressive strength program", "totalWeeks": {total_weeks}}}"#
    )
}
