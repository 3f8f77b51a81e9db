// ABOUTME: Main library entry point for the Pierre program engine
// ABOUTME: Provides sanitized AI training program generation over REST and SSE
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - recursion_limit: Increased from default 128 to 256 for complex derive macros
//   (serde, thiserror) on deeply nested types like the program aggregate
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Pierre Program Engine
//!
//! An AI training program generation service. Client intake text is sanitized
//! against prompt injection before any LLM prompt is built, programs are
//! generated either step by step or in a single model call, and every result
//! passes shared schema validation before it is persisted.
//!
//! ## Features
//!
//! - **Prompt-injection defense**: Ordered regex rule table with
//!   first-occurrence filtering and risk assessment
//! - **Sequential generation**: Explicit state machine with per-step guards
//!   and a final review gate
//! - **Streaming generation**: One model call, phases parsed live from the
//!   stream and reported over SSE
//! - **Local-first LLM support**: Any OpenAI-compatible endpoint (Ollama,
//!   vLLM, LocalAI)
//!
//! ## Quick Start
//!
//! 1. Point `LOCAL_LLM_BASE_URL` at an OpenAI-compatible endpoint
//! 2. Start the server with `pierre-program-engine`
//! 3. POST an intake form to `/api/programs/generate`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pierre_program_engine::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let config = ServerConfig::from_env()?;
//!
//!     println!("Pierre Program Engine configured with port: HTTP={}",
//!              config.http.port);
//!
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the server binary (src/bin/) and integration
// tests (tests/). They must remain `pub` so external consumers can access
// them.

/// Configuration management from environment variables
pub mod config;

/// Program storage on `SQLite`
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Program generation strategies, prompts, parsing, and validation
pub mod generation;

/// LLM provider abstraction for local and hosted OpenAI-compatible endpoints
pub mod llm;

/// Production logging and structured output
pub mod logging;

/// `HTTP` routes for program generation and health checks
pub mod routes;

/// Prompt-injection sanitization for client-supplied free text
pub mod sanitizer;

/// Server assembly and shared resources
pub mod server;
