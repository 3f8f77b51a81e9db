// ABOUTME: Domain types for client intake profiles and generated training programs
// ABOUTME: Covers profile enums, the generated program tree, and intake conversion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weeks assigned to each program phase
pub const WEEKS_PER_PHASE: u32 = 4;

/// Client sex for coaching context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Male client
    Male,
    /// Female client
    Female,
    /// Unspecified or other
    #[default]
    Other,
}

impl Sex {
    /// Stable label used in prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

/// Where the client primarily trains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrainingEnvironment {
    /// Commercial or home gym with machines
    #[default]
    Gym,
    /// Training at home
    Home,
    /// Frequently travelling, hotel gyms
    Travel,
    /// Outdoor training
    Outdoors,
}

impl TrainingEnvironment {
    /// Stable label used in prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gym => "gym",
            Self::Home => "home",
            Self::Travel => "travel",
            Self::Outdoors => "outdoors",
        }
    }
}

/// Equipment access tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentType {
    /// Full gym access
    #[default]
    FullGym,
    /// A small set of equipment (dumbbells, bands)
    Minimal,
    /// No equipment
    Bodyweight,
    /// Specific equipment listed in `available`
    Specific,
}

impl EquipmentType {
    /// Stable label used in prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FullGym => "full-gym",
            Self::Minimal => "minimal",
            Self::Bodyweight => "bodyweight",
            Self::Specific => "specific",
        }
    }
}

/// Self-reported training experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    /// New to structured training
    #[default]
    Beginner,
    /// Some consistent training history
    Intermediate,
    /// Years of structured training
    Advanced,
}

impl ExperienceLevel {
    /// Stable label used in prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Number of program phases generated for this experience level
    #[must_use]
    pub const fn phase_count(&self) -> u32 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 2,
            Self::Advanced => 3,
        }
    }
}

/// Primary training modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrainingStyle {
    /// Resistance training
    #[default]
    Strength,
    /// Yoga and mobility work
    Yoga,
    /// Cardiovascular conditioning
    Cardio,
    /// Mixed modality
    Hybrid,
}

impl TrainingStyle {
    /// Stable label used in prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Yoga => "yoga",
            Self::Cardio => "cardio",
            Self::Hybrid => "hybrid",
        }
    }
}

/// Training environment details
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    /// Primary training location
    pub primary: TrainingEnvironment,
    /// Secondary location, if the client splits time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<TrainingEnvironment>,
    /// Free-text constraints of the location (noise limits, floor space)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limitations: Option<Vec<String>>,
}

/// Equipment access details
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentInfo {
    /// Equipment access tier
    #[serde(rename = "type")]
    pub equipment_type: EquipmentType,
    /// Specific items on hand
    #[serde(default)]
    pub available: Vec<String>,
}

/// Preferred training styles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStyleInfo {
    /// Main style
    pub primary: TrainingStyle,
    /// Secondary style, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<TrainingStyle>,
}

/// Normalized client profile used to build generation prompts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Client sex
    pub sex: Sex,
    /// Primary training goal in the client's words
    pub training_goal: String,
    /// Body weight in pounds
    pub weight: f64,
    /// Training environment details
    pub environment: EnvironmentInfo,
    /// Equipment access details
    pub equipment: EquipmentInfo,
    /// Age in years
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Height in inches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Self-reported experience level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    /// Training days available per week
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_available: Option<u32>,
    /// Minutes available per session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_per_session: Option<u32>,
    /// Preferred training styles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TrainingStyleInfo>,
    /// Current or past injuries in the client's words
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injuries: Option<Vec<String>>,
    /// Exercise likes and dislikes in the client's words
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Vec<String>>,
    /// Anything else the client wrote in the intake form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

/// Raw intake payload from clients, including legacy field spellings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramIntake {
    /// Client sex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    /// Primary training goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_goal: Option<String>,
    /// Legacy spelling of the training goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
    /// Body weight in pounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Age in years
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Height in inches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Self-reported experience level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    /// Training days available per week
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_available: Option<u32>,
    /// Legacy spelling of days available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_per_week: Option<u32>,
    /// Minutes available per session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<u32>,
    /// Legacy spelling of the session budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_per_day: Option<u32>,
    /// Training environment details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentInfo>,
    /// Equipment access details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<EquipmentInfo>,
    /// Preferred training styles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TrainingStyleInfo>,
    /// Current or past injuries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injuries: Option<Vec<String>>,
    /// Exercise likes and dislikes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Vec<String>>,
    /// Legacy spelling of preferences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_preferences: Option<Vec<String>>,
    /// Anything else from the intake form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

/// Convert a raw intake payload into a normalized profile.
///
/// Legacy field spellings are folded in and missing values get conservative
/// defaults so older clients keep working.
#[must_use]
pub fn intake_to_profile(intake: &ProgramIntake) -> UserProfile {
    UserProfile {
        sex: intake.sex.unwrap_or_default(),
        training_goal: intake
            .training_goal
            .clone()
            .or_else(|| intake.goals.clone())
            .unwrap_or_else(|| "general fitness".to_owned()),
        weight: intake.weight.unwrap_or(150.0),
        environment: intake.environment.clone().unwrap_or_default(),
        equipment: intake.equipment.clone().unwrap_or_default(),
        age: intake.age,
        height: intake.height,
        experience_level: intake.experience_level,
        days_available: Some(intake.days_available.or(intake.days_per_week).unwrap_or(3)),
        time_per_session: Some(intake.daily_budget.or(intake.time_per_day).unwrap_or(60)),
        style: intake.style.clone(),
        injuries: Some(intake.injuries.clone().unwrap_or_default()),
        preferences: Some(
            intake
                .preferences
                .clone()
                .or_else(|| intake.training_preferences.clone())
                .unwrap_or_default(),
        ),
        additional_info: intake.additional_info.clone(),
    }
}

/// Why a new program is being generated for a returning client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationType {
    /// First program for this client
    #[default]
    New,
    /// Similar to the previous program
    Similar,
    /// Same client, new training focus
    NewFocus,
    /// Discard history and start over
    FreshStart,
}

impl GenerationType {
    /// Stable label used in prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Similar => "similar",
            Self::NewFocus => "new-focus",
            Self::FreshStart => "fresh-start",
        }
    }
}

/// Summary of a previously completed program
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousProgram {
    /// Program id
    pub id: String,
    /// Program name
    pub name: String,
    /// Fraction of scheduled workouts completed (0.0 to 1.0)
    pub completion_rate: f64,
    /// Goal the program targeted
    pub goal: String,
}

/// Most recent client check-in data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    /// Body weight in pounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Body fat percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
    /// Free-text notes from the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the check-in was recorded
    pub date: DateTime<Utc>,
}

/// Extra context for returning clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    /// Previously completed programs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_programs: Option<Vec<PreviousProgram>>,
    /// Most recent check-in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_check_in: Option<CheckIn>,
    /// Requested changes relative to the previous program
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifications: Option<Vec<String>>,
    /// Why a new program is being generated
    #[serde(default)]
    pub generation_type: GenerationType,
}

/// How an exercise dose is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasureType {
    /// Repetition count
    #[default]
    Reps,
    /// Duration in seconds
    Time,
    /// Distance in the given unit
    Distance,
}

impl MeasureType {
    /// Parse from string, normalizing anything unrecognized to reps
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "time" => Self::Time,
            "distance" => Self::Distance,
            _ => Self::Reps, // Default fallback (including "reps")
        }
    }
}

// Model output sometimes invents measure type labels; anything unrecognized
// normalizes to reps instead of failing the whole parse.
impl<'de> Deserialize<'de> for MeasureType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_str_or_default(&raw))
    }
}

/// Exercise dose description
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseMeasure {
    /// Measure kind
    #[serde(rename = "type", default)]
    pub measure_type: MeasureType,
    /// Reps, seconds, or distance amount
    pub value: f64,
    /// Unit for distance measures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Role an exercise plays within a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseCategory {
    /// Main compound movement
    #[default]
    Primary,
    /// Supporting compound movement
    Secondary,
    /// Single-joint accessory
    Isolation,
    /// Conditioning work
    Cardio,
    /// Stretching and mobility
    Flexibility,
}

impl ExerciseCategory {
    /// Ordering key within a workout (primary work first, flexibility last)
    #[must_use]
    pub const fn sort_key(&self) -> u8 {
        match self {
            Self::Primary => 1,
            Self::Secondary => 2,
            Self::Isolation => 3,
            Self::Cardio => 4,
            Self::Flexibility => 5,
        }
    }

    /// Stable label used in storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Isolation => "isolation",
            Self::Cardio => "cardio",
            Self::Flexibility => "flexibility",
        }
    }

    /// Parse from string, normalizing anything unrecognized to primary
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "secondary" => Self::Secondary,
            "isolation" => Self::Isolation,
            "cardio" => Self::Cardio,
            "flexibility" => Self::Flexibility,
            _ => Self::Primary, // Default fallback (including "primary")
        }
    }
}

/// A single exercise prescription
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedExercise {
    /// Exercise name
    pub name: String,
    /// Number of sets
    pub sets: u32,
    /// Dose per set
    pub measure: ExerciseMeasure,
    /// Rest between sets in seconds
    pub rest_period: u32,
    /// Equipment needed
    #[serde(default)]
    pub equipment: Vec<String>,
    /// Substitute exercises
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Role within the workout
    #[serde(default)]
    pub category: ExerciseCategory,
    /// Effort guidance (RPE, percentage)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<String>,
    /// Coaching notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Step-by-step form cues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,
}

/// Warmup or cooldown block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSegment {
    /// Duration in minutes
    pub duration: u32,
    /// Activities in the block
    #[serde(default)]
    pub activities: Vec<String>,
}

/// A single training day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedWorkout {
    /// Day of the week (1 through 7)
    pub day_number: u32,
    /// Workout name
    pub name: String,
    /// Training focus of the day
    pub focus: String,
    /// Warmup block
    #[serde(default)]
    pub warmup: WorkoutSegment,
    /// Cooldown block
    #[serde(default)]
    pub cooldown: WorkoutSegment,
    /// Ordered exercise prescriptions
    pub exercises: Vec<GeneratedExercise>,
}

/// Daily macro targets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroSplit {
    /// Protein grams per day
    pub protein: u32,
    /// Carbohydrate grams per day
    pub carbs: u32,
    /// Fat grams per day
    pub fats: u32,
}

/// Nutrition guidance for a phase
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedNutrition {
    /// Calorie target per day
    pub daily_calories: u32,
    /// Macro targets
    pub macros: MacroSplit,
    /// Meal timing guidance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_timing: Option<Vec<String>>,
    /// Coaching notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One phase of a training program
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPhase {
    /// Phase position within the program (1-based)
    pub phase_number: u32,
    /// Phase name
    pub name: String,
    /// Phase length in weeks
    pub duration_weeks: u32,
    /// Training focus of the phase
    pub focus: String,
    /// Why this phase comes now
    pub explanation: String,
    /// What the client should expect to feel and achieve
    pub expectations: String,
    /// Bullet points the client should remember
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Weekly split name
    pub split_type: String,
    /// Training days in one week of this phase
    pub workouts: Vec<GeneratedWorkout>,
    /// Nutrition guidance
    pub nutrition: GeneratedNutrition,
    /// How to progress week over week
    #[serde(default)]
    pub progression_protocol: Vec<String>,
}

/// A complete generated training program
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedProgram {
    /// Program name
    pub name: String,
    /// Program description
    pub description: String,
    /// Total program length in weeks
    pub total_weeks: u32,
    /// Ordered phases
    pub phases: Vec<GeneratedPhase>,
}

/// A generated program prepared for persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    /// Program id
    pub id: String,
    /// Program name
    pub name: String,
    /// Program description
    pub description: String,
    /// Total program length in weeks
    pub total_weeks: u32,
    /// Ordered phases
    pub phases: Vec<GeneratedPhase>,
    /// User the program was generated for
    pub created_for: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Program {
    /// Wrap a generated program for persistence with a fresh id
    #[must_use]
    pub fn from_generated(generated: GeneratedProgram, user_id: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: generated.name,
            description: generated.description,
            total_weeks: generated.total_weeks,
            phases: generated.phases,
            created_for: user_id.to_owned(),
            created_at: Utc::now(),
        }
    }
}

/// Timing and usage details for one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    /// Wall-clock generation time in milliseconds
    pub generation_time_ms: u64,
    /// Total tokens reported by the provider, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    /// Model that produced the program
    pub model: String,
}

/// Stably reorder every workout's exercises by category.
///
/// Primary work comes first, then secondary, isolation, cardio, and
/// flexibility. Ties keep their generated order.
pub fn sort_exercises_in_phase(phase: &mut GeneratedPhase) {
    for workout in &mut phase.workouts {
        workout.exercises.sort_by_key(|exercise| exercise.category.sort_key());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(name: &str, category: ExerciseCategory) -> GeneratedExercise {
        GeneratedExercise {
            name: name.to_owned(),
            sets: 3,
            measure: ExerciseMeasure {
                measure_type: MeasureType::Reps,
                value: 10.0,
                unit: None,
            },
            rest_period: 90,
            equipment: vec![],
            alternatives: vec![],
            category,
            intensity: None,
            notes: None,
            instructions: None,
        }
    }

    #[test]
    fn test_intake_defaults() {
        let profile = intake_to_profile(&ProgramIntake::default());
        assert_eq!(profile.sex, Sex::Other);
        assert_eq!(profile.training_goal, "general fitness");
        assert!((profile.weight - 150.0).abs() < f64::EPSILON);
        assert_eq!(profile.days_available, Some(3));
        assert_eq!(profile.time_per_session, Some(60));
        assert_eq!(profile.environment.primary, TrainingEnvironment::Gym);
        assert_eq!(profile.equipment.equipment_type, EquipmentType::FullGym);
        assert_eq!(profile.injuries, Some(vec![]));
    }

    #[test]
    fn test_intake_legacy_field_fallbacks() {
        let intake = ProgramIntake {
            goals: Some("build muscle".to_owned()),
            days_per_week: Some(5),
            time_per_day: Some(45),
            training_preferences: Some(vec!["barbell work".to_owned()]),
            ..ProgramIntake::default()
        };
        let profile = intake_to_profile(&intake);
        assert_eq!(profile.training_goal, "build muscle");
        assert_eq!(profile.days_available, Some(5));
        assert_eq!(profile.time_per_session, Some(45));
        assert_eq!(profile.preferences, Some(vec!["barbell work".to_owned()]));
    }

    #[test]
    fn test_intake_modern_fields_win_over_legacy() {
        let intake = ProgramIntake {
            training_goal: Some("strength".to_owned()),
            goals: Some("ignored".to_owned()),
            days_available: Some(4),
            days_per_week: Some(6),
            ..ProgramIntake::default()
        };
        let profile = intake_to_profile(&intake);
        assert_eq!(profile.training_goal, "strength");
        assert_eq!(profile.days_available, Some(4));
    }

    #[test]
    fn test_phase_count_by_experience() {
        assert_eq!(ExperienceLevel::Beginner.phase_count(), 1);
        assert_eq!(ExperienceLevel::Intermediate.phase_count(), 2);
        assert_eq!(ExperienceLevel::Advanced.phase_count(), 3);
    }

    #[test]
    fn test_measure_type_normalizes_unknown_labels() {
        assert_eq!(MeasureType::from_str_or_default("TIME"), MeasureType::Time);
        assert_eq!(
            MeasureType::from_str_or_default("repetitions"),
            MeasureType::Reps
        );

        let measure: ExerciseMeasure =
            serde_json::from_str(r#"{"type": "duration", "value": 30.0}"#)
                .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(measure.measure_type, MeasureType::Reps);
    }

    #[test]
    fn test_exercise_sort_is_stable_within_category() {
        let mut phase = GeneratedPhase {
            phase_number: 1,
            name: "Foundation".to_owned(),
            duration_weeks: 4,
            focus: "general".to_owned(),
            explanation: String::new(),
            expectations: String::new(),
            key_points: vec![],
            split_type: "Full Body".to_owned(),
            workouts: vec![GeneratedWorkout {
                day_number: 1,
                name: "Day 1".to_owned(),
                focus: "full body".to_owned(),
                warmup: WorkoutSegment::default(),
                cooldown: WorkoutSegment::default(),
                exercises: vec![
                    exercise("Stretch", ExerciseCategory::Flexibility),
                    exercise("Leg Curl", ExerciseCategory::Isolation),
                    exercise("Back Squat", ExerciseCategory::Primary),
                    exercise("Romanian Deadlift", ExerciseCategory::Secondary),
                    exercise("Calf Raise", ExerciseCategory::Isolation),
                ],
            }],
            nutrition: GeneratedNutrition {
                daily_calories: 2000,
                macros: MacroSplit {
                    protein: 150,
                    carbs: 200,
                    fats: 70,
                },
                meal_timing: None,
                notes: None,
            },
            progression_protocol: vec![],
        };

        sort_exercises_in_phase(&mut phase);
        let names: Vec<&str> = phase.workouts[0]
            .exercises
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "Back Squat",
                "Romanian Deadlift",
                "Leg Curl",
                "Calf Raise",
                "Stretch"
            ]
        );
    }

    #[test]
    fn test_profile_serde_uses_camel_case() {
        let profile = intake_to_profile(&ProgramIntake::default());
        let json = serde_json::to_value(&profile).unwrap_or_default();
        assert!(json.get("trainingGoal").is_some());
        assert!(json.get("daysAvailable").is_some());
        assert!(json["equipment"].get("type").is_some());
    }
}
