// ABOUTME: Configuration module for environment-based server settings
// ABOUTME: Provides typed config loading and validation for all runtime knobs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration management for the program engine.
//!
//! All runtime configuration comes from environment variables (optionally via
//! a `.env` file), parsed into strongly typed structures at startup.

pub mod environment;
pub mod types;

pub use environment::{DatabaseConfig, DatabaseUrl, GenerationConfig, HttpConfig, ServerConfig};
pub use types::{Environment, GenerationStrategy, LogLevel};
