// ABOUTME: Step-by-step program generation driven by an explicit state machine
// ABOUTME: Each step prompts the model once, parses with typed fallbacks, and gates hard failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sequential Program Generation
//!
//! Builds a program through five ordered model calls: overall structure,
//! weekly workout structure, detailed workouts for every phase, a nutrition
//! plan, and a final review. Each step folds its result into an accumulating
//! state that later prompts reference, so the model keeps full context
//! without one giant completion.
//!
//! Steps advance through [`GenerationStep`], an explicit machine with `Done`
//! and `Failed` as absorbing states. A step either produces a usable artifact
//! (parsed JSON or a typed fallback that passes its guard) or aborts the run;
//! nothing is persisted unless every step succeeds and the final review
//! approves the program.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::GenerationConfig;
use crate::errors::{AppError, AppResult};
use crate::generation::parser::strip_markdown_fences;
use crate::generation::prompts::{self, SYSTEM_PROMPT};
use crate::generation::schema::validate_program;
use crate::generation::types::{
    sort_exercises_in_phase, GeneratedNutrition, GeneratedPhase, GeneratedProgram,
    GeneratedWorkout, GenerationContext, GenerationMetadata, MacroSplit, Program, UserProfile,
    WEEKS_PER_PHASE,
};
use crate::generation::ProgramGenerator;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::logging::AppLogger;

/// The program schema allows at most six phases
const MAX_PHASES: usize = 6;

// ============================================================================
// Step Artifacts
// ============================================================================

/// Step 1 output: the skeleton of the whole program
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramStructure {
    /// Program name
    pub program_name: String,
    /// Program description
    pub program_description: String,
    /// Number of phases to generate
    pub phase_count: usize,
    /// Length of each phase in weeks
    pub phase_durations: Vec<u32>,
    /// Training emphasis of each phase
    pub phase_progression: Vec<String>,
    /// What the whole program works toward
    pub overall_goals: Vec<String>,
}

/// Exercise selection constraints the model commits to up front
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSelectionRules {
    /// Ratio of compound to isolation work, e.g. "2:1"
    pub compound_to_isolation_ratio: String,
    /// Exercises per training day
    pub exercises_per_workout: u32,
    /// Rest periods in seconds, keyed by exercise kind
    pub rest_periods: HashMap<String, u32>,
    /// Set counts, keyed by exercise kind
    pub set_ranges: HashMap<String, u32>,
    /// Rep targets, keyed by exercise kind
    pub rep_ranges: HashMap<String, u32>,
}

impl Default for ExerciseSelectionRules {
    fn default() -> Self {
        Self {
            compound_to_isolation_ratio: "2:1".to_owned(),
            exercises_per_workout: 6,
            rest_periods: HashMap::from([("default".to_owned(), 90)]),
            set_ranges: HashMap::from([("default".to_owned(), 3)]),
            rep_ranges: HashMap::from([("default".to_owned(), 10)]),
        }
    }
}

/// Step 2 output: the weekly training layout shared by all phases
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStructure {
    /// Training days per week
    pub days_per_week: u32,
    /// Session length in minutes
    pub session_duration: u32,
    /// Split name, e.g. "Upper/Lower"
    pub split_type: String,
    /// Focus of each training day in order
    pub workout_distribution: Vec<String>,
    /// Selection constraints carried into the detail prompts
    #[serde(default)]
    pub exercise_selection_rules: ExerciseSelectionRules,
}

impl WorkoutStructure {
    fn fallback(profile: &UserProfile) -> Self {
        Self {
            days_per_week: profile.days_available.unwrap_or(3),
            session_duration: profile.time_per_session.unwrap_or(60),
            split_type: "Full Body".to_owned(),
            workout_distribution: Vec::new(),
            exercise_selection_rules: ExerciseSelectionRules::default(),
        }
    }
}

/// Step 3 output: every workout of one phase plus phase-level context
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseWorkouts {
    /// Model-assigned id, unused downstream
    #[serde(default)]
    pub id: String,
    /// Training days for one week of the phase
    pub workouts: Vec<GeneratedWorkout>,
    /// Why this phase is structured the way it is
    #[serde(default)]
    pub phase_explanation: String,
    /// What the client should expect
    #[serde(default)]
    pub phase_expectations: String,
    /// Reminders for the client
    #[serde(default)]
    pub phase_key_points: Vec<String>,
    /// Split name for the phase
    #[serde(default)]
    pub split_type: String,
    /// Phase-specific nutrition, zero calories when the model omitted it
    #[serde(default)]
    pub nutrition: GeneratedNutrition,
}

impl PhaseWorkouts {
    fn fallback() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            workouts: Vec::new(),
            phase_explanation: String::new(),
            phase_expectations: String::new(),
            phase_key_points: Vec::new(),
            split_type: "Full Body".to_owned(),
            nutrition: GeneratedNutrition::default(),
        }
    }
}

/// Step 4 output: the program-wide nutrition plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionPlan {
    /// Calorie target per day
    pub daily_calories: u32,
    /// Macro targets
    pub macros: MacroSplit,
    /// Suggested supplements
    #[serde(default)]
    pub supplements: Vec<String>,
    /// Dietary restrictions honored by the plan
    #[serde(default)]
    pub restrictions: Vec<String>,
}

impl Default for NutritionPlan {
    fn default() -> Self {
        Self {
            daily_calories: 2000,
            macros: MacroSplit {
                protein: 150,
                carbs: 200,
                fats: 70,
            },
            supplements: Vec::new(),
            restrictions: Vec::new(),
        }
    }
}

impl NutritionPlan {
    fn to_phase_nutrition(&self) -> GeneratedNutrition {
        let mut parts = Vec::new();
        if !self.supplements.is_empty() {
            parts.push(format!("Supplements: {}", self.supplements.join(", ")));
        }
        if !self.restrictions.is_empty() {
            parts.push(format!("Restrictions: {}", self.restrictions.join(", ")));
        }
        let notes = if parts.is_empty() {
            None
        } else {
            Some(parts.join(". "))
        };

        GeneratedNutrition {
            daily_calories: self.daily_calories,
            macros: self.macros.clone(),
            meal_timing: None,
            notes,
        }
    }
}

/// Step 5 output: the model's own verdict on the assembled program
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramReview {
    /// Every planned element is present
    pub is_complete: bool,
    /// Nothing in the program is unsafe for this client
    pub is_safe: bool,
    /// The program matches the stated goal and constraints
    pub meets_client_needs: bool,
    /// Problems found, surfaced to the caller on rejection
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Non-blocking improvement ideas
    #[serde(default)]
    pub suggestions: Vec<String>,
}

// ============================================================================
// State Machine
// ============================================================================

/// One step of the sequential generation machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStep {
    /// Generate the overall program structure
    Structure,
    /// Generate the weekly workout layout
    WorkoutStructure,
    /// Generate detailed workouts for one phase (0-based index)
    WorkoutDetails {
        /// Phase index being detailed
        phase: usize,
    },
    /// Generate the program-wide nutrition plan
    Nutrition,
    /// Review the assembled program for completeness and safety
    FinalReview,
    /// Generation finished successfully
    Done,
    /// Generation aborted
    Failed,
}

impl GenerationStep {
    /// Stable label for logs and metrics
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::WorkoutStructure => "workout_structure",
            Self::WorkoutDetails { .. } => "workout_details",
            Self::Nutrition => "nutrition",
            Self::FinalReview => "final_review",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// Successor of a step given how many phases the structure step committed to.
///
/// `WorkoutDetails` loops once per phase; `Done` and `Failed` absorb.
#[must_use]
pub const fn next_step(current: GenerationStep, phase_count: usize) -> GenerationStep {
    match current {
        GenerationStep::Structure => GenerationStep::WorkoutStructure,
        GenerationStep::WorkoutStructure => {
            if phase_count == 0 {
                GenerationStep::Nutrition
            } else {
                GenerationStep::WorkoutDetails { phase: 0 }
            }
        }
        GenerationStep::WorkoutDetails { phase } => {
            if phase + 1 < phase_count {
                GenerationStep::WorkoutDetails { phase: phase + 1 }
            } else {
                GenerationStep::Nutrition
            }
        }
        GenerationStep::Nutrition => GenerationStep::FinalReview,
        GenerationStep::FinalReview => GenerationStep::Done,
        GenerationStep::Done => GenerationStep::Done,
        GenerationStep::Failed => GenerationStep::Failed,
    }
}

/// Artifacts accumulated while stepping through the machine
#[derive(Debug, Default)]
struct SequentialState {
    phase_count: usize,
    structure: Option<ProgramStructure>,
    workout_structure: Option<WorkoutStructure>,
    phases: Vec<PhaseWorkouts>,
    nutrition: Option<NutritionPlan>,
    tokens_used: u32,
    model: String,
}

// ============================================================================
// Generator
// ============================================================================

/// Drives the step machine against an LLM provider
pub struct SequentialProgramGenerator {
    provider: Arc<dyn LlmProvider>,
    generation: GenerationConfig,
}

impl SequentialProgramGenerator {
    /// Create a generator backed by the given provider
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, generation: GenerationConfig) -> Self {
        Self {
            provider,
            generation,
        }
    }

    /// Run one step: build its prompt, call the model, parse, and gate.
    async fn execute_step(
        &self,
        step: GenerationStep,
        profile: &UserProfile,
        state: &mut SequentialState,
    ) -> AppResult<GenerationStep> {
        match step {
            GenerationStep::Structure => {
                let prompt = prompts::build_structure_prompt(profile);
                let content = self.complete_step(step, prompt, state).await;
                let structure = artifact_or_fallback(step, content, ProgramStructure::default());
                if structure.program_name.trim().is_empty() {
                    return Err(AppError::generation("Failed to generate program structure"));
                }
                state.phase_count = structure.phase_count.min(MAX_PHASES);
                state.structure = Some(structure);
            }
            GenerationStep::WorkoutStructure => {
                let structure = require(&state.structure, "program structure")?;
                let prompt = prompts::build_workout_structure_prompt(profile, structure);
                let content = self.complete_step(step, prompt, state).await;
                let workout_structure =
                    artifact_or_fallback(step, content, WorkoutStructure::fallback(profile));
                if workout_structure.workout_distribution.is_empty() {
                    return Err(AppError::generation("Failed to generate workout structure"));
                }
                state.workout_structure = Some(workout_structure);
            }
            GenerationStep::WorkoutDetails { phase } => {
                let structure = require(&state.structure, "program structure")?;
                let workout_structure = require(&state.workout_structure, "workout structure")?;
                let prompt = prompts::build_workout_details_prompt(
                    profile,
                    structure,
                    workout_structure,
                    phase,
                );
                let content = self.complete_step(step, prompt, state).await;
                let phase_workouts = artifact_or_fallback(step, content, PhaseWorkouts::fallback());
                if phase_workouts.workouts.is_empty() {
                    return Err(AppError::generation(format!(
                        "Failed to generate workout details for phase {}",
                        phase + 1
                    )));
                }
                state.phases.push(phase_workouts);
            }
            GenerationStep::Nutrition => {
                let structure = require(&state.structure, "program structure")?;
                let prompt = prompts::build_nutrition_prompt(profile, structure);
                let content = self.complete_step(step, prompt, state).await;
                let nutrition = artifact_or_fallback(step, content, NutritionPlan::default());
                if nutrition.daily_calories == 0 {
                    return Err(AppError::generation("Failed to generate nutrition plan"));
                }
                state.nutrition = Some(nutrition);
            }
            GenerationStep::FinalReview => {
                let structure = require(&state.structure, "program structure")?;
                let workout_structure = require(&state.workout_structure, "workout structure")?;
                let nutrition = require(&state.nutrition, "nutrition plan")?;
                let prompt = prompts::build_review_prompt(
                    profile,
                    structure,
                    workout_structure,
                    &state.phases,
                    nutrition,
                );
                let content = self.complete_step(step, prompt, state).await;
                let review: ProgramReview =
                    artifact_or_fallback(step, content, ProgramReview::default());
                if !(review.is_complete && review.is_safe && review.meets_client_needs) {
                    return Err(AppError::review_rejected(format!(
                        "Program review failed: {}",
                        review.warnings.join(", ")
                    )));
                }
                if !review.suggestions.is_empty() {
                    info!("Program review suggestions: {}", review.suggestions.join("; "));
                }
            }
            GenerationStep::Done | GenerationStep::Failed => {}
        }

        Ok(next_step(step, state.phase_count))
    }

    /// One model call with the shared system prompt, logged with its outcome
    async fn complete_step(
        &self,
        step: GenerationStep,
        prompt: String,
        state: &mut SequentialState,
    ) -> AppResult<String> {
        let started = Instant::now();
        let request = ChatRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_temperature(self.generation.temperature)
        .with_max_tokens(self.generation.max_tokens);

        let result = self.provider.complete(&request).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        AppLogger::log_generation_step("sequential", step.name(), result.is_ok(), duration_ms);

        let response = result?;
        if let Some(usage) = &response.usage {
            state.tokens_used = state.tokens_used.saturating_add(usage.total_tokens);
        }
        state.model = response.model;
        Ok(response.content)
    }
}

#[async_trait]
impl ProgramGenerator for SequentialProgramGenerator {
    fn strategy(&self) -> &'static str {
        "sequential"
    }

    /// Generate a complete program for a sanitized, validated profile.
    ///
    /// The sequential strategy derives everything from the profile; the
    /// returning-client context only enriches the single-shot prompts.
    async fn generate(
        &self,
        profile: &UserProfile,
        _context: Option<&GenerationContext>,
        user_id: &str,
    ) -> AppResult<(Program, GenerationMetadata)> {
        let started = Instant::now();
        let mut state = SequentialState::default();
        let mut step = GenerationStep::Structure;
        let mut failure: Option<AppError> = None;

        while !matches!(step, GenerationStep::Done | GenerationStep::Failed) {
            step = match self.execute_step(step, profile, &mut state).await {
                Ok(next) => next,
                Err(e) => {
                    error!("Sequential generation aborted at step {}: {e}", step.name());
                    failure = Some(e);
                    GenerationStep::Failed
                }
            };
        }

        if let Some(e) = failure {
            return Err(e);
        }

        let metadata = GenerationMetadata {
            generation_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            tokens_used: (state.tokens_used > 0).then_some(state.tokens_used),
            model: if state.model.is_empty() {
                self.provider.default_model().to_owned()
            } else {
                state.model.clone()
            },
        };

        let program = assemble_program(profile, user_id, state)?;
        info!(
            "Sequential generation completed in {}ms with {} phases",
            metadata.generation_time_ms,
            program.phases.len()
        );
        Ok((program, metadata))
    }
}

/// Resolve a step's artifact from the provider call outcome.
///
/// A failed provider call is treated the same as an unparseable response:
/// the step's typed default stands in and the step guard decides whether the
/// run can continue. The transport error itself is only logged.
fn artifact_or_fallback<T: DeserializeOwned>(
    step: GenerationStep,
    content: AppResult<String>,
    fallback: T,
) -> T {
    match content {
        Ok(text) => parse_or_fallback(step, &text, fallback),
        Err(e) => {
            warn!(
                "Provider call failed during {}, using fallback: {e}",
                step.name()
            );
            fallback
        }
    }
}

/// Parse a step response, falling back to the step's typed default.
///
/// The fallback is deliberately incomplete where the step is critical, so
/// the step guard still rejects an unusable result.
fn parse_or_fallback<T: DeserializeOwned>(step: GenerationStep, content: &str, fallback: T) -> T {
    let cleaned = strip_markdown_fences(content);
    match serde_json::from_str(cleaned) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(
                "Failed to parse {} response, using fallback: {e}",
                step.name()
            );
            fallback
        }
    }
}

fn require<'a, T>(artifact: &'a Option<T>, label: &str) -> AppResult<&'a T> {
    artifact
        .as_ref()
        .ok_or_else(|| AppError::internal(format!("Missing {label} for current generation step")))
}

fn non_empty_or(value: String, fallback: String) -> String {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Fold the accumulated step artifacts into a validated program.
fn assemble_program(
    profile: &UserProfile,
    user_id: &str,
    state: SequentialState,
) -> AppResult<Program> {
    let structure = state
        .structure
        .ok_or_else(|| AppError::internal("Program structure missing after generation"))?;
    let workout_structure = state
        .workout_structure
        .ok_or_else(|| AppError::internal("Workout structure missing after generation"))?;
    let nutrition_plan = state
        .nutrition
        .ok_or_else(|| AppError::internal("Nutrition plan missing after generation"))?;

    let mut phases = Vec::with_capacity(state.phases.len());
    for (index, phase_workouts) in state.phases.into_iter().enumerate() {
        let phase_number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let duration_weeks = structure
            .phase_durations
            .get(index)
            .copied()
            .unwrap_or(WEEKS_PER_PHASE);
        let focus = structure
            .phase_progression
            .get(index)
            .filter(|text| !text.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| profile.training_goal.clone());

        let nutrition = if phase_workouts.nutrition.daily_calories == 0 {
            nutrition_plan.to_phase_nutrition()
        } else {
            phase_workouts.nutrition
        };

        let explanation = non_empty_or(
            phase_workouts.phase_explanation,
            format!("Phase {phase_number} builds {focus} with progressive weekly loading."),
        );
        let expectations = non_empty_or(
            phase_workouts.phase_expectations,
            "Expect gradual improvements in strength and work capacity.".to_owned(),
        );
        let split_type = non_empty_or(
            phase_workouts.split_type,
            non_empty_or(workout_structure.split_type.clone(), "Full Body".to_owned()),
        );
        let key_points = if phase_workouts.phase_key_points.is_empty() {
            vec![format!(
                "Stay consistent through all {duration_weeks} weeks of this phase."
            )]
        } else {
            phase_workouts.phase_key_points
        };

        phases.push(GeneratedPhase {
            phase_number,
            name: format!("Phase {phase_number}"),
            duration_weeks,
            focus,
            explanation,
            expectations,
            key_points,
            split_type,
            workouts: phase_workouts.workouts,
            nutrition,
            progression_protocol: vec![
                "Add weight or reps once all prescribed sets are completed with good form."
                    .to_owned(),
                "Deload for a week if performance stalls on two consecutive sessions.".to_owned(),
            ],
        });
    }

    for phase in &mut phases {
        sort_exercises_in_phase(phase);
    }

    let total_weeks: u32 = phases.iter().map(|phase| phase.duration_weeks).sum();
    let description = non_empty_or(
        structure.program_description,
        format!(
            "A {total_weeks}-week program targeting {}.",
            profile.training_goal
        ),
    );

    let generated = GeneratedProgram {
        name: structure.program_name,
        description,
        total_weeks,
        phases,
    };

    let report = validate_program(&generated);
    if !report.ok {
        return Err(AppError::generation(format!(
            "Generated program failed validation: {}",
            report.describe()
        )));
    }

    Ok(Program::from_generated(generated, user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::types::{
        intake_to_profile, ExerciseCategory, ExerciseMeasure, GeneratedExercise, MeasureType,
        ProgramIntake, WorkoutSegment,
    };

    fn profile() -> UserProfile {
        intake_to_profile(&ProgramIntake::default())
    }

    fn valid_workout(day: u32) -> GeneratedWorkout {
        GeneratedWorkout {
            day_number: day,
            name: format!("Day {day}"),
            focus: "full body".to_owned(),
            warmup: WorkoutSegment {
                duration: 10,
                activities: vec!["bike".to_owned()],
            },
            cooldown: WorkoutSegment {
                duration: 5,
                activities: vec!["stretch".to_owned()],
            },
            exercises: vec![GeneratedExercise {
                name: "Back Squat".to_owned(),
                sets: 4,
                measure: ExerciseMeasure {
                    measure_type: MeasureType::Reps,
                    value: 6.0,
                    unit: None,
                },
                rest_period: 180,
                equipment: vec!["barbell".to_owned()],
                alternatives: vec!["Goblet Squat".to_owned()],
                category: ExerciseCategory::Primary,
                intensity: None,
                notes: None,
                instructions: None,
            }],
        }
    }

    fn structure_fixture() -> ProgramStructure {
        ProgramStructure {
            program_name: "Strength Builder".to_owned(),
            program_description: "A two phase strength program".to_owned(),
            phase_count: 2,
            phase_durations: vec![4, 4],
            phase_progression: vec!["base strength".to_owned(), "peak strength".to_owned()],
            overall_goals: vec!["add 20 lbs to the squat".to_owned()],
        }
    }

    fn phase_workouts_fixture() -> PhaseWorkouts {
        PhaseWorkouts {
            id: "p1".to_owned(),
            workouts: vec![valid_workout(1)],
            phase_explanation: String::new(),
            phase_expectations: String::new(),
            phase_key_points: Vec::new(),
            split_type: String::new(),
            nutrition: GeneratedNutrition::default(),
        }
    }

    fn state_fixture() -> SequentialState {
        SequentialState {
            phase_count: 2,
            structure: Some(structure_fixture()),
            workout_structure: Some(WorkoutStructure {
                days_per_week: 3,
                session_duration: 60,
                split_type: "Upper/Lower".to_owned(),
                workout_distribution: vec!["upper".to_owned(), "lower".to_owned()],
                exercise_selection_rules: ExerciseSelectionRules::default(),
            }),
            phases: vec![phase_workouts_fixture(), phase_workouts_fixture()],
            nutrition: Some(NutritionPlan::default()),
            ..SequentialState::default()
        }
    }

    #[test]
    fn test_step_walk_visits_every_phase() {
        let mut step = GenerationStep::Structure;
        let mut visited = Vec::new();
        while step != GenerationStep::Done {
            step = next_step(step, 2);
            visited.push(step);
        }
        assert_eq!(
            visited,
            vec![
                GenerationStep::WorkoutStructure,
                GenerationStep::WorkoutDetails { phase: 0 },
                GenerationStep::WorkoutDetails { phase: 1 },
                GenerationStep::Nutrition,
                GenerationStep::FinalReview,
                GenerationStep::Done,
            ]
        );
    }

    #[test]
    fn test_done_and_failed_absorb() {
        assert_eq!(next_step(GenerationStep::Done, 3), GenerationStep::Done);
        assert_eq!(next_step(GenerationStep::Failed, 3), GenerationStep::Failed);
    }

    #[test]
    fn test_zero_phases_skip_workout_details() {
        assert_eq!(
            next_step(GenerationStep::WorkoutStructure, 0),
            GenerationStep::Nutrition
        );
    }

    #[test]
    fn test_parse_or_fallback_on_malformed_json() {
        let structure: ProgramStructure = parse_or_fallback(
            GenerationStep::Structure,
            "I could not produce JSON",
            ProgramStructure::default(),
        );
        assert!(structure.program_name.is_empty());
    }

    #[test]
    fn test_artifact_fallback_on_provider_error() {
        let review: ProgramReview = artifact_or_fallback(
            GenerationStep::FinalReview,
            Err(AppError::external_service("llm", "connection refused")),
            ProgramReview::default(),
        );
        assert!(!review.is_complete && !review.is_safe && !review.meets_client_needs);
    }

    #[test]
    fn test_parse_or_fallback_strips_fences() {
        let fenced = "```json\n{\"isComplete\": true, \"isSafe\": true, \"meetsClientNeeds\": true}\n```";
        let review: ProgramReview =
            parse_or_fallback(GenerationStep::FinalReview, fenced, ProgramReview::default());
        assert!(review.is_complete && review.is_safe && review.meets_client_needs);
    }

    #[test]
    fn test_workout_structure_fallback_uses_profile() {
        let mut profile = profile();
        profile.days_available = Some(5);
        let fallback = WorkoutStructure::fallback(&profile);
        assert_eq!(fallback.days_per_week, 5);
        assert!(fallback.workout_distribution.is_empty());
    }

    #[test]
    fn test_nutrition_plan_notes_include_restrictions() {
        let plan = NutritionPlan {
            supplements: vec!["creatine".to_owned()],
            restrictions: vec!["no dairy".to_owned()],
            ..NutritionPlan::default()
        };
        let nutrition = plan.to_phase_nutrition();
        let notes = nutrition.notes.unwrap();
        assert!(notes.contains("creatine"));
        assert!(notes.contains("no dairy"));
    }

    #[test]
    fn test_assemble_program_totals_and_ordering() {
        let program = assemble_program(&profile(), "user-1", state_fixture()).unwrap();
        assert_eq!(program.total_weeks, 8);
        assert_eq!(program.phases.len(), 2);
        assert_eq!(program.phases[0].phase_number, 1);
        assert_eq!(program.phases[0].focus, "base strength");
        assert_eq!(program.phases[1].name, "Phase 2");
        assert!(!program.phases[0].progression_protocol.is_empty());
        assert_eq!(program.created_for, "user-1");
    }

    #[test]
    fn test_assemble_swaps_zero_calorie_phase_nutrition() {
        let program = assemble_program(&profile(), "user-1", state_fixture()).unwrap();
        assert_eq!(program.phases[0].nutrition.daily_calories, 2000);
    }

    #[test]
    fn test_assemble_inherits_split_type_from_workout_structure() {
        let program = assemble_program(&profile(), "user-1", state_fixture()).unwrap();
        assert_eq!(program.phases[0].split_type, "Upper/Lower");
    }

    #[test]
    fn test_assemble_rejects_empty_phase_list() {
        let mut state = state_fixture();
        state.phases.clear();
        let err = assemble_program(&profile(), "user-1", state).unwrap_err();
        assert!(err.to_string().contains("failed validation"));
    }
}
