// ABOUTME: Program route handlers for AI training program generation
// ABOUTME: Provides REST and SSE endpoints for generating, fetching, and listing programs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Program generation routes
//!
//! This module handles program generation requests. Client intake text is
//! sanitized before any prompt is built, the configured generation strategy
//! produces the program, and the result is persisted exactly once after all
//! validation gates pass.

use crate::{
    database::{ProgramStore, ProgramSummary, SavedProgram},
    errors::AppError,
    generation::schema::{validate_context, validate_profile},
    generation::single_shot::GenerationEvent,
    generation::types::{
        intake_to_profile, GenerationContext, GenerationMetadata, Program, ProgramIntake,
        UserProfile,
    },
    logging::AppLogger,
    sanitizer::sanitize_user_profile,
    server::ServerResources,
};
use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{delete, get, post},
    Json, Router,
};
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{convert::Infallible, sync::Arc};
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to generate a new training program
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateProgramRequest {
    /// Client intake form
    pub intake: ProgramIntake,
    /// Extra context for returning clients
    #[serde(default)]
    pub context: Option<GenerationContext>,
    /// Client the program is generated for
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Response for a completed generation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateProgramResponse {
    /// Always true on the success path
    pub success: bool,
    /// The generated program
    pub program: Program,
    /// Persistence receipt
    pub saved_program: SavedProgram,
    /// Timing and usage details
    pub metadata: GenerationMetadata,
}

/// Query parameters for listing programs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProgramsQuery {
    /// Client whose programs to list
    pub user_id: String,
}

/// Response for listing programs
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramListResponse {
    /// Program summaries, newest first
    pub programs: Vec<ProgramSummary>,
    /// Total count
    pub total: usize,
}

/// Sanitized and validated generation inputs
struct PreparedGeneration {
    profile: UserProfile,
    context: Option<GenerationContext>,
    user_id: String,
}

// ============================================================================
// Routes
// ============================================================================

/// Program routes implementation
pub struct ProgramRoutes;

impl ProgramRoutes {
    /// Create all program routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/programs/generate", post(Self::generate_program))
            .route(
                "/api/programs/generate/stream",
                post(Self::generate_program_stream),
            )
            .route("/api/programs", get(Self::list_programs))
            .route("/api/programs/:program_id", get(Self::get_program))
            .route("/api/programs/:program_id", delete(Self::delete_program))
            .with_state(resources)
    }

    /// Generate a program with the configured strategy and persist it
    async fn generate_program(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<GenerateProgramRequest>,
    ) -> Result<Json<GenerateProgramResponse>, AppError> {
        let prepared = Self::prepare_generation(request)?;

        let (program, metadata) = resources
            .program_generator
            .generate(
                &prepared.profile,
                prepared.context.as_ref(),
                &prepared.user_id,
            )
            .await?;

        let saved_program = resources.program_store.create_program(&program).await?;
        info!(
            "Generated program {} for user {} via {} strategy",
            saved_program.id,
            prepared.user_id,
            resources.program_generator.strategy()
        );

        Ok(Json(GenerateProgramResponse {
            success: true,
            program,
            saved_program,
            metadata,
        }))
    }

    /// Generate a program with the streaming strategy, reporting progress via SSE
    async fn generate_program_stream(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<GenerateProgramRequest>,
    ) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
        let prepared = Self::prepare_generation(request)?;

        let mut events = resources.single_shot.clone().stream_generation(
            prepared.profile,
            prepared.context,
            prepared.user_id,
            resources.program_store.clone(),
        );

        let stream = async_stream::stream! {
            while let Some(event) = events.recv().await {
                yield Ok(Self::sse_event(event));
            }
        };

        Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
    }

    /// Fetch a stored program by id
    async fn get_program(
        State(resources): State<Arc<ServerResources>>,
        Path(program_id): Path<String>,
    ) -> Result<Json<Program>, AppError> {
        let program = resources
            .program_store
            .get_program(&program_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Program {program_id} not found")))?;

        Ok(Json(program))
    }

    /// List stored programs for a user
    async fn list_programs(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ListProgramsQuery>,
    ) -> Result<Json<ProgramListResponse>, AppError> {
        let programs = resources.program_store.list_programs(&query.user_id).await?;
        let total = programs.len();

        Ok(Json(ProgramListResponse { programs, total }))
    }

    /// Delete a stored program
    async fn delete_program(
        State(resources): State<Arc<ServerResources>>,
        Path(program_id): Path<String>,
    ) -> Result<Json<serde_json::Value>, AppError> {
        let deleted = resources.program_store.delete_program(&program_id).await?;
        if !deleted {
            return Err(AppError::not_found(format!(
                "Program {program_id} not found"
            )));
        }

        Ok(Json(json!({ "success": true })))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Sanitize the intake, log anything suspicious, and validate the inputs
    fn prepare_generation(
        request: GenerateProgramRequest,
    ) -> Result<PreparedGeneration, AppError> {
        let user_id = request.user_id.unwrap_or_else(|| "anonymous".to_owned());

        let profile = intake_to_profile(&request.intake);
        let (profile, risk_reports) = sanitize_user_profile(&profile);
        for report in &risk_reports {
            AppLogger::log_suspicious_input(
                &report.field,
                report.risk_level.as_str(),
                &report.flagged_patterns,
                Some(&user_id),
            );
        }

        let report = validate_profile(&profile);
        if !report.ok {
            return Err(AppError::invalid_input(format!(
                "Invalid intake profile: {}",
                report.describe()
            )));
        }

        if let Some(context) = &request.context {
            let report = validate_context(context);
            if !report.ok {
                return Err(AppError::invalid_input(format!(
                    "Invalid generation context: {}",
                    report.describe()
                )));
            }
        }

        Ok(PreparedGeneration {
            profile,
            context: request.context,
            user_id,
        })
    }

    /// Map a generation event to a named SSE event
    fn sse_event(event: GenerationEvent) -> Event {
        let (name, payload) = Self::event_payload(event);
        Event::default().event(name).data(payload.to_string())
    }

    /// Wire name and JSON payload for a generation event.
    ///
    /// Progress events carry `{stage, message, progress}` so clients can show
    /// the stage text directly; error events carry `{error}`.
    fn event_payload(event: GenerationEvent) -> (&'static str, serde_json::Value) {
        match event {
            GenerationEvent::Progress { stage, progress } => (
                "progress",
                json!({
                    "stage": stage,
                    "message": stage.message(),
                    "progress": progress,
                }),
            ),
            GenerationEvent::Phase {
                phase_number,
                total_phases,
                phase,
            } => (
                "phase",
                json!({
                    "phaseNumber": phase_number,
                    "totalPhases": total_phases,
                    "phase": phase,
                }),
            ),
            GenerationEvent::ProgramMeta {
                name,
                description,
                total_weeks,
            } => (
                "program_meta",
                json!({
                    "name": name,
                    "description": description,
                    "totalWeeks": total_weeks,
                }),
            ),
            GenerationEvent::Complete {
                program,
                saved,
                metadata,
            } => {
                let phases_generated = program.phases.len();
                (
                    "complete",
                    json!({
                        "success": true,
                        "program": program,
                        "savedProgram": saved,
                        "metadata": {
                            "generationTimeMs": metadata.generation_time_ms,
                            "tokensUsed": metadata.tokens_used,
                            "model": metadata.model,
                            "phasesGenerated": phases_generated,
                        },
                    }),
                )
            }
            GenerationEvent::Error { message } => ("error", json!({ "error": message })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::single_shot::GenerationStage;

    #[test]
    fn test_progress_payload_carries_stage_message_and_percent() {
        let (name, payload) =
            ProgramRoutes::event_payload(GenerationEvent::progress(GenerationStage::Analyzing));

        assert_eq!(name, "progress");
        assert_eq!(payload["stage"], "analyzing");
        assert_eq!(payload["message"], "Analyzing your profile...");
        assert_eq!(payload["progress"], 10);
    }

    #[test]
    fn test_error_payload_uses_error_key() {
        let (name, payload) = ProgramRoutes::event_payload(GenerationEvent::Error {
            message: "No phases were generated".to_owned(),
        });

        assert_eq!(name, "error");
        assert_eq!(payload["error"], "No phases were generated");
        assert!(payload.get("message").is_none());
    }
}
