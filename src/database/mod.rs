// ABOUTME: Database management for the program engine's SQLite storage
// ABOUTME: Owns the connection pool and idempotent schema migrations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! Owns the `SQLite` connection pool and the program storage schema. The
//! schema is created with idempotent `CREATE TABLE IF NOT EXISTS` statements
//! so startup migration can run on every boot.

pub mod programs;

pub use programs::{ProgramStore, ProgramSummary, SavedProgram};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, AppResult};
use sqlx::SqlitePool;

/// Database manager for program storage
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection and run migrations when configured
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// migration statement fails.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let url = config.url.to_connection_string();
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if url == "sqlite::memory:" {
            url
        } else {
            format!("{url}?mode=rwc")
        };

        let pool = SqlitePool::connect(&connection_options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        if config.auto_migrate {
            db.migrate().await?;
        }

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails.
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_programs().await?;
        Ok(())
    }

    /// Create program storage tables
    async fn migrate_programs(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS programs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                total_weeks INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create programs table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS program_phases (
                id TEXT PRIMARY KEY,
                program_id TEXT NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
                phase_number INTEGER NOT NULL,
                name TEXT NOT NULL,
                duration_weeks INTEGER NOT NULL,
                focus TEXT NOT NULL,
                explanation TEXT NOT NULL,
                expectations TEXT NOT NULL,
                key_points TEXT NOT NULL DEFAULT '[]',
                split_type TEXT NOT NULL,
                nutrition TEXT NOT NULL,
                progression_protocol TEXT NOT NULL DEFAULT '[]'
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create program_phases table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS phase_workouts (
                id TEXT PRIMARY KEY,
                phase_id TEXT NOT NULL REFERENCES program_phases(id) ON DELETE CASCADE,
                day_number INTEGER NOT NULL,
                name TEXT NOT NULL,
                focus TEXT NOT NULL,
                warmup TEXT NOT NULL,
                cooldown TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create phase_workouts table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_exercises (
                id TEXT PRIMARY KEY,
                workout_id TEXT NOT NULL REFERENCES phase_workouts(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                sets INTEGER NOT NULL,
                measure TEXT NOT NULL,
                rest_period INTEGER NOT NULL,
                equipment TEXT NOT NULL DEFAULT '[]',
                alternatives TEXT NOT NULL DEFAULT '[]',
                category TEXT NOT NULL,
                intensity TEXT,
                notes TEXT,
                instructions TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create workout_exercises table: {e}"))
        })?;

        // Indexes for the common lookup paths
        for statement in [
            "CREATE INDEX IF NOT EXISTS idx_programs_user ON programs(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_program_phases_program ON program_phases(program_id)",
            "CREATE INDEX IF NOT EXISTS idx_phase_workouts_phase ON phase_workouts(phase_id)",
            "CREATE INDEX IF NOT EXISTS idx_workout_exercises_workout ON workout_exercises(workout_id)",
        ] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to create index: {e}")))?;
        }

        Ok(())
    }
}
