// ABOUTME: Program generation pipeline: domain types, prompts, parsing, and two strategies
// ABOUTME: Defines the strategy-independent ProgramGenerator capability both strategies implement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Program Generation
//!
//! Everything between a sanitized client profile and a validated, persisted
//! training program:
//!
//! - [`types`]: the program domain model shared by both strategies
//! - [`prompts`]: prompt builders for every generation call
//! - [`schema`]: output bounds validation with path-addressed issues
//! - [`parser`]: incremental parsing of delimiter-framed streaming output
//! - [`sequential`]: the five-step state machine strategy
//! - [`single_shot`]: the one-call strategy with a streaming variant
//!
//! The strategies differ in how they talk to the model but share prompts
//! vocabulary, the domain model, and final schema validation. Callers pick
//! one through [`ProgramGenerator`] without caring which is behind it.

pub mod parser;
pub mod prompts;
pub mod schema;
pub mod sequential;
pub mod single_shot;
pub mod types;

pub use parser::{ParseEvent, PhaseStreamParser, ProgramMeta};
pub use sequential::{next_step, GenerationStep, SequentialProgramGenerator};
pub use single_shot::{GenerationEvent, GenerationStage, SingleShotProgramGenerator};

use async_trait::async_trait;

use crate::errors::AppResult;
use types::{GenerationContext, GenerationMetadata, Program, UserProfile};

/// Strategy-independent program generation capability.
///
/// Implementations must return only programs that already passed output
/// schema validation; persistence stays with the caller.
#[async_trait]
pub trait ProgramGenerator: Send + Sync {
    /// Strategy label used in logs and response metadata
    fn strategy(&self) -> &'static str;

    /// Generate and validate a complete program for one client.
    ///
    /// # Errors
    ///
    /// Returns an error when the model cannot produce a usable program, when
    /// a review or validation gate rejects the result, or when the provider
    /// call itself fails.
    async fn generate(
        &self,
        profile: &UserProfile,
        context: Option<&GenerationContext>,
        user_id: &str,
    ) -> AppResult<(Program, GenerationMetadata)>;
}
