// ABOUTME: Bounds validation for generated programs and client profiles
// ABOUTME: Produces path-addressed issue reports shared by both generation strategies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::generation::types::{
    GeneratedExercise, GeneratedNutrition, GeneratedPhase, GeneratedProgram, GeneratedWorkout,
    GenerationContext, UserProfile,
};
use serde::Serialize;

/// A single validation failure with the JSON path that caused it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// JSON path of the offending value
    pub path: String,
    /// What is wrong with it
    pub message: String,
}

/// Outcome of validating a generated structure
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// True when no issues were found
    pub ok: bool,
    /// All issues found, in document order
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            ok: issues.is_empty(),
            issues,
        }
    }

    /// Render all issues as a single line for error messages and logs
    #[must_use]
    pub fn describe(&self) -> String {
        self.issues
            .iter()
            .map(|issue| format!("{}: {}", issue.path, issue.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validate a complete generated program against output bounds.
#[must_use]
pub fn validate_program(program: &GeneratedProgram) -> ValidationReport {
    let mut issues = Vec::new();

    check_text(&mut issues, "name", &program.name, 200);
    check_text(&mut issues, "description", &program.description, 2000);
    check_range(&mut issues, "totalWeeks", program.total_weeks, 1, 52);
    check_count(&mut issues, "phases", program.phases.len(), 1, 6);

    for (index, phase) in program.phases.iter().enumerate() {
        collect_phase_issues(&mut issues, &format!("phases[{index}]"), phase);
    }

    ValidationReport::from_issues(issues)
}

/// Validate one phase in isolation, as the streaming parser receives them.
#[must_use]
pub fn validate_phase(phase: &GeneratedPhase) -> ValidationReport {
    let mut issues = Vec::new();
    collect_phase_issues(&mut issues, "phase", phase);
    ValidationReport::from_issues(issues)
}

/// Validate client profile bounds before any generation work starts.
#[must_use]
pub fn validate_profile(profile: &UserProfile) -> ValidationReport {
    let mut issues = Vec::new();

    if !(50.0..=500.0).contains(&profile.weight) {
        flag(&mut issues, "weight", "must be between 50 and 500 pounds");
    }
    if let Some(age) = profile.age {
        check_range(&mut issues, "age", age, 13, 100);
    }
    if let Some(height) = profile.height {
        check_range(&mut issues, "height", height, 36, 96);
    }
    if let Some(days) = profile.days_available {
        check_range(&mut issues, "daysAvailable", days, 1, 7);
    }
    if let Some(minutes) = profile.time_per_session {
        check_range(&mut issues, "timePerSession", minutes, 15, 180);
    }

    ValidationReport::from_issues(issues)
}

/// Validate returning-client context bounds.
#[must_use]
pub fn validate_context(context: &GenerationContext) -> ValidationReport {
    let mut issues = Vec::new();

    if let Some(previous) = &context.previous_programs {
        for (index, program) in previous.iter().enumerate() {
            if !(0.0..=1.0).contains(&program.completion_rate) {
                flag(
                    &mut issues,
                    &format!("previousPrograms[{index}].completionRate"),
                    "must be between 0 and 1",
                );
            }
        }
    }
    if let Some(check_in) = &context.recent_check_in {
        if let Some(body_fat) = check_in.body_fat {
            if !(1.0..=60.0).contains(&body_fat) {
                flag(
                    &mut issues,
                    "recentCheckIn.bodyFat",
                    "must be between 1 and 60 percent",
                );
            }
        }
        if let Some(weight) = check_in.weight {
            if !(50.0..=500.0).contains(&weight) {
                flag(
                    &mut issues,
                    "recentCheckIn.weight",
                    "must be between 50 and 500 pounds",
                );
            }
        }
    }

    ValidationReport::from_issues(issues)
}

fn collect_phase_issues(issues: &mut Vec<ValidationIssue>, path: &str, phase: &GeneratedPhase) {
    check_range(
        issues,
        &format!("{path}.phaseNumber"),
        phase.phase_number,
        1,
        6,
    );
    check_text(issues, &format!("{path}.name"), &phase.name, 200);
    check_range(
        issues,
        &format!("{path}.durationWeeks"),
        phase.duration_weeks,
        1,
        12,
    );
    check_text(issues, &format!("{path}.focus"), &phase.focus, 500);
    check_text(
        issues,
        &format!("{path}.explanation"),
        &phase.explanation,
        2000,
    );
    check_text(
        issues,
        &format!("{path}.expectations"),
        &phase.expectations,
        2000,
    );
    check_count(
        issues,
        &format!("{path}.keyPoints"),
        phase.key_points.len(),
        1,
        10,
    );
    check_text(issues, &format!("{path}.splitType"), &phase.split_type, 100);
    check_count(
        issues,
        &format!("{path}.workouts"),
        phase.workouts.len(),
        1,
        7,
    );

    for (index, workout) in phase.workouts.iter().enumerate() {
        collect_workout_issues(issues, &format!("{path}.workouts[{index}]"), workout);
    }

    collect_nutrition_issues(issues, &format!("{path}.nutrition"), &phase.nutrition);

    if phase.progression_protocol.is_empty() {
        flag(
            issues,
            &format!("{path}.progressionProtocol"),
            "must not be empty",
        );
    }
}

fn collect_workout_issues(issues: &mut Vec<ValidationIssue>, path: &str, workout: &GeneratedWorkout) {
    check_range(
        issues,
        &format!("{path}.dayNumber"),
        workout.day_number,
        1,
        7,
    );
    check_text(issues, &format!("{path}.name"), &workout.name, 200);
    check_text(issues, &format!("{path}.focus"), &workout.focus, 500);
    if workout.warmup.duration > 30 {
        flag(
            issues,
            &format!("{path}.warmup.duration"),
            "must be at most 30 minutes",
        );
    }
    if workout.cooldown.duration > 30 {
        flag(
            issues,
            &format!("{path}.cooldown.duration"),
            "must be at most 30 minutes",
        );
    }
    check_count(
        issues,
        &format!("{path}.exercises"),
        workout.exercises.len(),
        1,
        15,
    );

    for (index, exercise) in workout.exercises.iter().enumerate() {
        collect_exercise_issues(issues, &format!("{path}.exercises[{index}]"), exercise);
    }
}

fn collect_exercise_issues(
    issues: &mut Vec<ValidationIssue>,
    path: &str,
    exercise: &GeneratedExercise,
) {
    check_text(issues, &format!("{path}.name"), &exercise.name, 200);
    check_range(issues, &format!("{path}.sets"), exercise.sets, 1, 10);
    if exercise.measure.value <= 0.0 {
        flag(
            issues,
            &format!("{path}.measure.value"),
            "must be greater than zero",
        );
    }
    if exercise.rest_period > 600 {
        flag(
            issues,
            &format!("{path}.restPeriod"),
            "must be at most 600 seconds",
        );
    }
    if let Some(instructions) = &exercise.instructions {
        if instructions.len() > 5 {
            flag(
                issues,
                &format!("{path}.instructions"),
                "must have at most 5 entries",
            );
        }
    }
}

fn collect_nutrition_issues(
    issues: &mut Vec<ValidationIssue>,
    path: &str,
    nutrition: &GeneratedNutrition,
) {
    check_range(
        issues,
        &format!("{path}.dailyCalories"),
        nutrition.daily_calories,
        1000,
        10000,
    );
    if nutrition.macros.protein > 500 {
        flag(
            issues,
            &format!("{path}.macros.protein"),
            "must be at most 500 grams",
        );
    }
    if nutrition.macros.carbs > 1000 {
        flag(
            issues,
            &format!("{path}.macros.carbs"),
            "must be at most 1000 grams",
        );
    }
    if nutrition.macros.fats > 500 {
        flag(
            issues,
            &format!("{path}.macros.fats"),
            "must be at most 500 grams",
        );
    }
}

fn check_text(issues: &mut Vec<ValidationIssue>, path: &str, value: &str, max_len: usize) {
    if value.trim().is_empty() {
        flag(issues, path, "must not be empty");
    } else if value.len() > max_len {
        flag(issues, path, format!("must be at most {max_len} characters"));
    }
}

fn check_range(issues: &mut Vec<ValidationIssue>, path: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        flag(issues, path, format!("must be between {min} and {max}"));
    }
}

fn check_count(issues: &mut Vec<ValidationIssue>, path: &str, count: usize, min: usize, max: usize) {
    if count < min || count > max {
        flag(
            issues,
            path,
            format!("must have between {min} and {max} entries"),
        );
    }
}

fn flag(issues: &mut Vec<ValidationIssue>, path: &str, message: impl Into<String>) {
    issues.push(ValidationIssue {
        path: path.to_owned(),
        message: message.into(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::types::{
        ExerciseCategory, ExerciseMeasure, GeneratedExercise, GeneratedNutrition, GeneratedPhase,
        GeneratedProgram, GeneratedWorkout, MacroSplit, MeasureType, WorkoutSegment,
    };

    fn valid_exercise() -> GeneratedExercise {
        GeneratedExercise {
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
            intensity: Some("RPE 8".to_owned()),
            notes: None,
            instructions: None,
        }
    }

    fn valid_phase() -> GeneratedPhase {
        GeneratedPhase {
            phase_number: 1,
            name: "Foundation".to_owned(),
            duration_weeks: 4,
            focus: "movement quality".to_owned(),
            explanation: "Build base strength".to_owned(),
            expectations: "Steady progress".to_owned(),
            key_points: vec!["Train consistently".to_owned()],
            split_type: "Full Body".to_owned(),
            workouts: vec![GeneratedWorkout {
                day_number: 1,
                name: "Day 1".to_owned(),
                focus: "full body".to_owned(),
                warmup: WorkoutSegment {
                    duration: 10,
                    activities: vec!["bike".to_owned()],
                },
                cooldown: WorkoutSegment {
                    duration: 5,
                    activities: vec!["stretch".to_owned()],
                },
                exercises: vec![valid_exercise()],
            }],
            nutrition: GeneratedNutrition {
                daily_calories: 2400,
                macros: MacroSplit {
                    protein: 180,
                    carbs: 250,
                    fats: 80,
                },
                meal_timing: None,
                notes: None,
            },
            progression_protocol: vec!["add 5 lbs weekly".to_owned()],
        }
    }

    fn valid_program() -> GeneratedProgram {
        GeneratedProgram {
            name: "Strength Foundation".to_owned(),
            description: "A 4 week introduction to barbell training".to_owned(),
            total_weeks: 4,
            phases: vec![valid_phase()],
        }
    }

    #[test]
    fn test_valid_program_passes() {
        let report = validate_program(&valid_program());
        assert!(report.ok, "unexpected issues: {}", report.describe());
    }

    #[test]
    fn test_out_of_range_sets_flagged_with_path() {
        let mut program = valid_program();
        program.phases[0].workouts[0].exercises[0].sets = 12;
        let report = validate_program(&program);
        assert!(!report.ok);
        assert!(report
            .issues
            .iter()
            .any(|i| i.path == "phases[0].workouts[0].exercises[0].sets"));
    }

    #[test]
    fn test_empty_workouts_flagged() {
        let mut phase = valid_phase();
        phase.workouts.clear();
        let report = validate_phase(&phase);
        assert!(!report.ok);
        assert!(report.issues.iter().any(|i| i.path == "phase.workouts"));
    }

    #[test]
    fn test_missing_progression_protocol_flagged() {
        let mut phase = valid_phase();
        phase.progression_protocol.clear();
        let report = validate_phase(&phase);
        assert!(report
            .issues
            .iter()
            .any(|i| i.path == "phase.progressionProtocol"));
    }

    #[test]
    fn test_nutrition_bounds() {
        let mut program = valid_program();
        program.phases[0].nutrition.daily_calories = 500;
        program.phases[0].nutrition.macros.carbs = 1500;
        let report = validate_program(&program);
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn test_profile_bounds() {
        use crate::generation::types::{intake_to_profile, ProgramIntake};

        let mut profile = intake_to_profile(&ProgramIntake::default());
        assert!(validate_profile(&profile).ok);

        profile.weight = 20.0;
        profile.age = Some(8);
        let report = validate_profile(&profile);
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn test_describe_joins_paths_and_messages() {
        let mut program = valid_program();
        program.total_weeks = 0;
        let report = validate_program(&program);
        assert!(report.describe().contains("totalWeeks: must be between 1 and 52"));
    }
}
