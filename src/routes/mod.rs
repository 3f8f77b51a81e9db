// ABOUTME: HTTP route modules for the program engine API
// ABOUTME: Aggregates program generation and health check endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP API routes.
//!
//! Program generation endpoints live under `/api/programs`; health and
//! readiness probes live at the root.

pub mod health;
pub mod programs;

pub use health::HealthRoutes;
pub use programs::{
    GenerateProgramRequest, GenerateProgramResponse, ListProgramsQuery, ProgramListResponse,
    ProgramRoutes,
};
