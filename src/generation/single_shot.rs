// ABOUTME: One-call program generation with a continuation retry and a streaming runner
// ABOUTME: The streaming variant emits staged progress, phases, and metadata over a channel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Single-Shot Program Generation
//!
//! Generates the whole program from one completion instead of the sequential
//! step machine. Two entry points share the prompt and validation path:
//!
//! - [`ProgramGenerator::generate`] performs a blocking completion, retrying
//!   once with a continuation prompt when the model ran out of tokens before
//!   emitting every expected phase.
//! - [`SingleShotProgramGenerator::stream_generation`] performs a streaming
//!   completion, parsing delimiter-framed phases as they arrive and emitting
//!   [`GenerationEvent`]s on a channel. Generation and persistence keep
//!   running even when the receiver goes away.
//!
//! Both paths finish with the same schema validation the sequential strategy
//! uses, and nothing is persisted unless validation passes.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

use crate::config::GenerationConfig;
use crate::database::{ProgramStore, SavedProgram};
use crate::errors::{AppError, AppResult};
use crate::generation::parser::{strip_markdown_fences, ParseEvent, PhaseStreamParser, ProgramMeta};
use crate::generation::prompts::{self, STREAMING_SYSTEM_PROMPT, SYSTEM_PROMPT};
use crate::generation::schema::validate_program;
use crate::generation::types::{
    sort_exercises_in_phase, GeneratedPhase, GeneratedProgram, GenerationContext,
    GenerationMetadata, Program, UserProfile,
};
use crate::generation::ProgramGenerator;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::logging::AppLogger;

// ============================================================================
// Streaming Events
// ============================================================================

/// Fixed reporting stages of a streaming generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStage {
    /// Request accepted, prompt being prepared
    Analyzing,
    /// Model call opened, deltas arriving
    Generating,
    /// Stream finished, collecting parsed phases
    Processing,
    /// Assembled program being validated
    Validating,
    /// Program being persisted
    Saving,
    /// Everything finished
    Complete,
}

impl GenerationStage {
    /// Percent complete reported for this stage
    #[must_use]
    pub const fn progress(self) -> u8 {
        match self {
            Self::Analyzing => 10,
            Self::Generating => 20,
            Self::Processing => 50,
            Self::Validating => 70,
            Self::Saving => 85,
            Self::Complete => 100,
        }
    }

    /// Stable label used in event payloads
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Analyzing => "analyzing",
            Self::Generating => "generating",
            Self::Processing => "processing",
            Self::Validating => "validating",
            Self::Saving => "saving",
            Self::Complete => "complete",
        }
    }

    /// Display text clients show alongside the progress bar
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Analyzing => "Analyzing your profile...",
            Self::Generating => "Designing your program...",
            Self::Processing => "Processing generated phases...",
            Self::Validating => "Validating your program...",
            Self::Saving => "Saving your program...",
            Self::Complete => "Your program is ready!",
        }
    }
}

/// One event emitted by a streaming generation run
#[derive(Debug)]
pub enum GenerationEvent {
    /// A stage boundary was crossed
    Progress {
        /// Stage just entered
        stage: GenerationStage,
        /// Percent complete, monotonically increasing
        progress: u8,
    },
    /// A complete phase was parsed from the stream
    Phase {
        /// The phase's own 1-based number
        phase_number: u32,
        /// Expected number of phases for this client
        total_phases: u32,
        /// The parsed phase
        phase: Box<GeneratedPhase>,
    },
    /// The model emitted its program metadata document
    ProgramMeta {
        /// Program name
        name: String,
        /// Program description
        description: String,
        /// Total program length in weeks
        total_weeks: u32,
    },
    /// Generation, validation, and persistence all succeeded
    Complete {
        /// The persisted program
        program: Box<Program>,
        /// Persistence receipt
        saved: SavedProgram,
        /// Timing and model details
        metadata: GenerationMetadata,
    },
    /// Generation aborted; no program was saved after this event
    Error {
        /// Human-readable failure description
        message: String,
    },
}

impl GenerationEvent {
    /// Progress event for a stage with its fixed percentage
    #[must_use]
    pub const fn progress(stage: GenerationStage) -> Self {
        Self::Progress {
            stage,
            progress: stage.progress(),
        }
    }
}

/// Continuation responses carry only the missing phases
#[derive(Debug, Deserialize)]
struct ContinuationPhases {
    phases: Vec<GeneratedPhase>,
}

// ============================================================================
// Generator
// ============================================================================

/// Generates a whole program from a single model call
pub struct SingleShotProgramGenerator {
    provider: Arc<dyn LlmProvider>,
    generation: GenerationConfig,
}

impl SingleShotProgramGenerator {
    /// Create a generator backed by the given provider
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, generation: GenerationConfig) -> Self {
        Self {
            provider,
            generation,
        }
    }

    /// Start a streaming generation run on a background task.
    ///
    /// Events arrive on the returned channel: progress for each stage, one
    /// event per parsed phase, optional metadata, then exactly one of
    /// `Complete` or `Error`. Dropping the receiver does not cancel the run;
    /// a valid program is still persisted.
    #[must_use]
    pub fn stream_generation(
        self: Arc<Self>,
        profile: UserProfile,
        context: Option<GenerationContext>,
        user_id: String,
        store: ProgramStore,
    ) -> mpsc::UnboundedReceiver<GenerationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            if let Err(e) = self
                .run_stream(&profile, context.as_ref(), &user_id, &store, &tx)
                .await
            {
                error!("Streaming generation failed: {e}");
                send(&tx, GenerationEvent::Error {
                    message: e.to_string(),
                });
            }
        });

        rx
    }

    async fn run_stream(
        &self,
        profile: &UserProfile,
        context: Option<&GenerationContext>,
        user_id: &str,
        store: &ProgramStore,
        tx: &mpsc::UnboundedSender<GenerationEvent>,
    ) -> AppResult<()> {
        let started = Instant::now();
        send(tx, GenerationEvent::progress(GenerationStage::Analyzing));

        let prompt = prompts::build_streaming_generation_prompt(profile, context);
        let request = ChatRequest::new(vec![
            ChatMessage::system(STREAMING_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_temperature(self.generation.temperature)
        .with_max_tokens(self.generation.max_tokens)
        .with_streaming();

        send(tx, GenerationEvent::progress(GenerationStage::Generating));

        let call_started = Instant::now();
        let stream_result = self.provider.complete_stream(&request).await;
        AppLogger::log_generation_step(
            "single_shot_stream",
            "open_stream",
            stream_result.is_ok(),
            elapsed_ms(call_started),
        );
        let mut stream = stream_result?;

        let total_phases = expected_phase_count(profile);
        let mut parser = PhaseStreamParser::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for event in parser.add_chunk(&chunk.delta) {
                match event {
                    ParseEvent::Phase(phase) => {
                        send(tx, GenerationEvent::Phase {
                            phase_number: phase.phase_number,
                            total_phases,
                            phase,
                        });
                    }
                    ParseEvent::Meta(meta) => {
                        send(tx, GenerationEvent::ProgramMeta {
                            name: meta.name,
                            description: meta.description,
                            total_weeks: meta.total_weeks,
                        });
                    }
                    ParseEvent::Skipped { reason } => {
                        warn!("Dropped streamed segment: {reason}");
                    }
                }
            }
            if chunk.is_final {
                break;
            }
        }

        send(tx, GenerationEvent::progress(GenerationStage::Processing));

        let (mut phases, meta) = parser.finish();
        if phases.is_empty() {
            return Err(AppError::generation("No phases were generated"));
        }
        let meta = meta.unwrap_or_else(|| ProgramMeta::fallback_for(&phases));

        send(tx, GenerationEvent::progress(GenerationStage::Validating));

        for phase in &mut phases {
            sort_exercises_in_phase(phase);
        }

        let generated = GeneratedProgram {
            name: meta.name,
            description: meta.description,
            total_weeks: meta.total_weeks,
            phases,
        };

        let report = validate_program(&generated);
        if !report.ok {
            return Err(AppError::generation(format!(
                "Generated program failed validation: {}",
                report.describe()
            )));
        }

        let program = Program::from_generated(generated, user_id);

        send(tx, GenerationEvent::progress(GenerationStage::Saving));
        let saved = store.create_program(&program).await?;

        let metadata = GenerationMetadata {
            generation_time_ms: elapsed_ms(started),
            tokens_used: None,
            model: self.provider.default_model().to_owned(),
        };

        info!(
            "Streaming generation completed in {}ms with {} phases",
            metadata.generation_time_ms,
            program.phases.len()
        );

        send(tx, GenerationEvent::progress(GenerationStage::Complete));
        send(tx, GenerationEvent::Complete {
            program: Box::new(program),
            saved,
            metadata,
        });

        Ok(())
    }

    /// One continuation call asking only for the phases still missing
    async fn continue_truncated_program(
        &self,
        profile: &UserProfile,
        program: &mut GeneratedProgram,
        expected: u32,
    ) -> AppResult<Option<u32>> {
        let generated_count = u32::try_from(program.phases.len()).unwrap_or(u32::MAX);
        let remaining = expected.saturating_sub(generated_count);
        warn!(
            "Generation truncated at {generated_count} of {expected} phases, requesting continuation"
        );

        let prompt = prompts::build_continuation_prompt(profile, &program.phases, remaining);
        let request = ChatRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_temperature(self.generation.temperature)
        .with_max_tokens(self.generation.max_tokens);

        let started = Instant::now();
        let result = self.provider.complete(&request).await;
        AppLogger::log_generation_step(
            "single_shot",
            "continuation",
            result.is_ok(),
            elapsed_ms(started),
        );
        let response = result?;

        let cleaned = strip_markdown_fences(&response.content);
        let continuation: ContinuationPhases = serde_json::from_str(cleaned).map_err(|e| {
            AppError::generation(format!("Failed to parse continuation phases: {e}"))
        })?;

        program.phases.extend(continuation.phases);
        Ok(response.usage.map(|u| u.total_tokens))
    }
}

#[async_trait]
impl ProgramGenerator for SingleShotProgramGenerator {
    fn strategy(&self) -> &'static str {
        "single_shot"
    }

    async fn generate(
        &self,
        profile: &UserProfile,
        context: Option<&GenerationContext>,
        user_id: &str,
    ) -> AppResult<(Program, GenerationMetadata)> {
        let started = Instant::now();

        let prompt = prompts::build_generation_prompt(profile, context);
        let request = ChatRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_temperature(self.generation.temperature)
        .with_max_tokens(self.generation.max_tokens);

        let call_started = Instant::now();
        let result = self.provider.complete(&request).await;
        AppLogger::log_generation_step(
            "single_shot",
            "generate",
            result.is_ok(),
            elapsed_ms(call_started),
        );
        let response = result?;

        let cleaned = strip_markdown_fences(&response.content);
        let mut generated: GeneratedProgram = serde_json::from_str(cleaned).map_err(|e| {
            AppError::generation(format!("Failed to parse generated program: {e}"))
        })?;

        let mut tokens_used = response.usage.as_ref().map(|u| u.total_tokens);

        let expected = expected_phase_count(profile);
        let generated_count = u32::try_from(generated.phases.len()).unwrap_or(u32::MAX);
        if response.finish_reason.as_deref() == Some("length") && generated_count < expected {
            let continuation_tokens = self
                .continue_truncated_program(profile, &mut generated, expected)
                .await?;
            if let Some(extra) = continuation_tokens {
                tokens_used = Some(tokens_used.unwrap_or(0).saturating_add(extra));
            }
        }

        // The phase array's order is authoritative after a merge
        for (index, phase) in generated.phases.iter_mut().enumerate() {
            phase.phase_number = u32::try_from(index + 1).unwrap_or(u32::MAX);
            sort_exercises_in_phase(phase);
        }

        let report = validate_program(&generated);
        if !report.ok {
            return Err(AppError::generation(format!(
                "Generated program failed validation: {}",
                report.describe()
            )));
        }

        let metadata = GenerationMetadata {
            generation_time_ms: elapsed_ms(started),
            tokens_used,
            model: if response.model.is_empty() {
                self.provider.default_model().to_owned()
            } else {
                response.model
            },
        };

        let program = Program::from_generated(generated, user_id);
        info!(
            "Single-shot generation completed in {}ms with {} phases",
            metadata.generation_time_ms,
            program.phases.len()
        );

        Ok((program, metadata))
    }
}

/// Forward an event, ignoring a receiver that already went away
fn send(tx: &mpsc::UnboundedSender<GenerationEvent>, event: GenerationEvent) {
    let _ = tx.send(event);
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn expected_phase_count(profile: &UserProfile) -> u32 {
    profile.experience_level.unwrap_or_default().phase_count()
}
