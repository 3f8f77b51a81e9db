// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Provides liveness and readiness endpoints with an LLM provider summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check routes for service monitoring
//!
//! This module provides health and readiness endpoints for monitoring and
//! load balancer health checks. The health endpoint additionally reports
//! whether the configured LLM provider is reachable.

use crate::server::ServerResources;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::health))
            .route("/ready", get(Self::ready))
            .with_state(resources)
    }

    /// Liveness check with an LLM provider reachability summary
    async fn health(State(resources): State<Arc<ServerResources>>) -> Json<serde_json::Value> {
        let provider_healthy = resources
            .llm_provider
            .health_check()
            .await
            .unwrap_or(false);

        Json(json!({
            "status": if provider_healthy { "healthy" } else { "degraded" },
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "llmProvider": {
                "name": resources.llm_provider.name(),
                "model": resources.llm_provider.default_model(),
                "healthy": provider_healthy,
            },
            "generationStrategy": resources.program_generator.strategy(),
        }))
    }

    /// Readiness check
    async fn ready() -> Json<serde_json::Value> {
        Json(json!({
            "status": "ready",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }
}
