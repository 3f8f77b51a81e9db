// ABOUTME: Database operations for generated training programs
// ABOUTME: Stores and reassembles the program/phase/workout/exercise aggregate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use crate::generation::types::{
    ExerciseCategory, ExerciseMeasure, GeneratedExercise, GeneratedNutrition, GeneratedPhase,
    GeneratedWorkout, Program, WorkoutSegment,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

// ============================================================================
// Record Types
// ============================================================================

/// Confirmation of a stored program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProgram {
    /// Stored program id
    pub id: String,
    /// Stored program name
    pub name: String,
}

/// Summary of a stored program for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSummary {
    /// Program id
    pub id: String,
    /// Program name
    pub name: String,
    /// Program description
    pub description: String,
    /// Total program length in weeks
    pub total_weeks: u32,
    /// Number of phases in the program
    pub phase_count: i64,
    /// When the program was created
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Program Store
// ============================================================================

/// Program database operations manager
#[derive(Clone)]
pub struct ProgramStore {
    pool: SqlitePool,
}

impl ProgramStore {
    /// Create a new program store
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a complete program aggregate in a single transaction.
    ///
    /// Inserting a program id that already exists fails the transaction and
    /// leaves the database unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization of a nested value fails or a
    /// database operation fails.
    pub async fn create_program(&self, program: &Program) -> AppResult<SavedProgram> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO programs (id, user_id, name, description, total_weeks, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&program.id)
        .bind(&program.created_for)
        .bind(&program.name)
        .bind(&program.description)
        .bind(program.total_weeks)
        .bind(program.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert program: {e}")))?;

        for phase in &program.phases {
            let phase_id = Self::insert_phase(&mut tx, &program.id, phase).await?;
            for workout in &phase.workouts {
                let workout_id = Self::insert_workout(&mut tx, &phase_id, workout).await?;
                for (position, exercise) in workout.exercises.iter().enumerate() {
                    Self::insert_exercise(&mut tx, &workout_id, position, exercise).await?;
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit program: {e}")))?;

        Ok(SavedProgram {
            id: program.id.clone(),
            name: program.name.clone(),
        })
    }

    /// Fetch a stored program aggregate by id
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails or a stored value
    /// cannot be decoded.
    pub async fn get_program(&self, program_id: &str) -> AppResult<Option<Program>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, description, total_weeks, created_at
            FROM programs
            WHERE id = $1
            ",
        )
        .bind(program_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get program: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let phases = self.load_phases(program_id).await?;

        Ok(Some(Program {
            id: row.get("id"),
            created_for: row.get("user_id"),
            name: row.get("name"),
            description: row.get("description"),
            total_weeks: row.get("total_weeks"),
            created_at: row.get("created_at"),
            phases,
        }))
    }

    /// List stored programs for a user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn list_programs(&self, user_id: &str) -> AppResult<Vec<ProgramSummary>> {
        let rows = sqlx::query(
            r"
            SELECT p.id, p.name, p.description, p.total_weeks, p.created_at,
                   COUNT(ph.id) as phase_count
            FROM programs p
            LEFT JOIN program_phases ph ON ph.program_id = p.id
            WHERE p.user_id = $1
            GROUP BY p.id
            ORDER BY p.created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list programs: {e}")))?;

        let summaries = rows
            .into_iter()
            .map(|r| ProgramSummary {
                id: r.get("id"),
                name: r.get("name"),
                description: r.get("description"),
                total_weeks: r.get("total_weeks"),
                phase_count: r.get("phase_count"),
                created_at: r.get("created_at"),
            })
            .collect();

        Ok(summaries)
    }

    /// Delete a stored program and its phases, workouts, and exercises
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn delete_program(&self, program_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(program_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete program: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Insert Helpers
    // ========================================================================

    async fn insert_phase(
        tx: &mut Transaction<'_, Sqlite>,
        program_id: &str,
        phase: &GeneratedPhase,
    ) -> AppResult<String> {
        let phase_id = Uuid::new_v4().to_string();
        sqlx::query(
            r"
            INSERT INTO program_phases (id, program_id, phase_number, name, duration_weeks,
                                        focus, explanation, expectations, key_points,
                                        split_type, nutrition, progression_protocol)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(&phase_id)
        .bind(program_id)
        .bind(phase.phase_number)
        .bind(&phase.name)
        .bind(phase.duration_weeks)
        .bind(&phase.focus)
        .bind(&phase.explanation)
        .bind(&phase.expectations)
        .bind(encode_json("key points", &phase.key_points)?)
        .bind(&phase.split_type)
        .bind(encode_json("nutrition", &phase.nutrition)?)
        .bind(encode_json(
            "progression protocol",
            &phase.progression_protocol,
        )?)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert phase: {e}")))?;

        Ok(phase_id)
    }

    async fn insert_workout(
        tx: &mut Transaction<'_, Sqlite>,
        phase_id: &str,
        workout: &GeneratedWorkout,
    ) -> AppResult<String> {
        let workout_id = Uuid::new_v4().to_string();
        sqlx::query(
            r"
            INSERT INTO phase_workouts (id, phase_id, day_number, name, focus, warmup, cooldown)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&workout_id)
        .bind(phase_id)
        .bind(workout.day_number)
        .bind(&workout.name)
        .bind(&workout.focus)
        .bind(encode_json("warmup", &workout.warmup)?)
        .bind(encode_json("cooldown", &workout.cooldown)?)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert workout: {e}")))?;

        Ok(workout_id)
    }

    async fn insert_exercise(
        tx: &mut Transaction<'_, Sqlite>,
        workout_id: &str,
        position: usize,
        exercise: &GeneratedExercise,
    ) -> AppResult<()> {
        let instructions = exercise
            .instructions
            .as_ref()
            .map(|steps| encode_json("instructions", steps))
            .transpose()?;

        sqlx::query(
            r"
            INSERT INTO workout_exercises (id, workout_id, position, name, sets, measure,
                                           rest_period, equipment, alternatives, category,
                                           intensity, notes, instructions)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(workout_id)
        .bind(i64::try_from(position).unwrap_or(i64::MAX))
        .bind(&exercise.name)
        .bind(exercise.sets)
        .bind(encode_json("measure", &exercise.measure)?)
        .bind(exercise.rest_period)
        .bind(encode_json("equipment", &exercise.equipment)?)
        .bind(encode_json("alternatives", &exercise.alternatives)?)
        .bind(exercise.category.as_str())
        .bind(exercise.intensity.as_deref())
        .bind(exercise.notes.as_deref())
        .bind(instructions)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert exercise: {e}")))?;

        Ok(())
    }

    // ========================================================================
    // Load Helpers
    // ========================================================================

    async fn load_phases(&self, program_id: &str) -> AppResult<Vec<GeneratedPhase>> {
        let rows = sqlx::query(
            r"
            SELECT id, phase_number, name, duration_weeks, focus, explanation, expectations,
                   key_points, split_type, nutrition, progression_protocol
            FROM program_phases
            WHERE program_id = $1
            ORDER BY phase_number ASC
            ",
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load phases: {e}")))?;

        let mut phases = Vec::with_capacity(rows.len());
        for row in rows {
            let phase_id: String = row.get("id");
            let nutrition: GeneratedNutrition =
                decode_json("nutrition", &row.get::<String, _>("nutrition"))?;
            let workouts = self.load_workouts(&phase_id).await?;
            phases.push(GeneratedPhase {
                phase_number: row.get("phase_number"),
                name: row.get("name"),
                duration_weeks: row.get("duration_weeks"),
                focus: row.get("focus"),
                explanation: row.get("explanation"),
                expectations: row.get("expectations"),
                key_points: decode_json("key points", &row.get::<String, _>("key_points"))?,
                split_type: row.get("split_type"),
                workouts,
                nutrition,
                progression_protocol: decode_json(
                    "progression protocol",
                    &row.get::<String, _>("progression_protocol"),
                )?,
            });
        }

        Ok(phases)
    }

    async fn load_workouts(&self, phase_id: &str) -> AppResult<Vec<GeneratedWorkout>> {
        let rows = sqlx::query(
            r"
            SELECT id, day_number, name, focus, warmup, cooldown
            FROM phase_workouts
            WHERE phase_id = $1
            ORDER BY day_number ASC
            ",
        )
        .bind(phase_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load workouts: {e}")))?;

        let mut workouts = Vec::with_capacity(rows.len());
        for row in rows {
            let workout_id: String = row.get("id");
            let warmup: WorkoutSegment = decode_json("warmup", &row.get::<String, _>("warmup"))?;
            let cooldown: WorkoutSegment =
                decode_json("cooldown", &row.get::<String, _>("cooldown"))?;
            let exercises = self.load_exercises(&workout_id).await?;
            workouts.push(GeneratedWorkout {
                day_number: row.get("day_number"),
                name: row.get("name"),
                focus: row.get("focus"),
                warmup,
                cooldown,
                exercises,
            });
        }

        Ok(workouts)
    }

    async fn load_exercises(&self, workout_id: &str) -> AppResult<Vec<GeneratedExercise>> {
        let rows = sqlx::query(
            r"
            SELECT name, sets, measure, rest_period, equipment, alternatives, category,
                   intensity, notes, instructions
            FROM workout_exercises
            WHERE workout_id = $1
            ORDER BY position ASC
            ",
        )
        .bind(workout_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load exercises: {e}")))?;

        let mut exercises = Vec::with_capacity(rows.len());
        for row in rows {
            let measure: ExerciseMeasure =
                decode_json("measure", &row.get::<String, _>("measure"))?;
            let instructions = row
                .get::<Option<String>, _>("instructions")
                .map(|raw| decode_json("instructions", &raw))
                .transpose()?;
            exercises.push(GeneratedExercise {
                name: row.get("name"),
                sets: row.get("sets"),
                measure,
                rest_period: row.get("rest_period"),
                equipment: decode_json("equipment", &row.get::<String, _>("equipment"))?,
                alternatives: decode_json("alternatives", &row.get::<String, _>("alternatives"))?,
                category: ExerciseCategory::from_str_or_default(&row.get::<String, _>("category")),
                intensity: row.get("intensity"),
                notes: row.get("notes"),
                instructions,
            });
        }

        Ok(exercises)
    }
}

fn encode_json<T: Serialize>(label: &str, value: &T) -> AppResult<String> {
    serde_json::to_string(value)
        .map_err(|e| AppError::database(format!("Failed to encode {label}: {e}")))
}

fn decode_json<T: DeserializeOwned>(label: &str, raw: &str) -> AppResult<T> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::database(format!("Failed to decode stored {label}: {e}")))
}
