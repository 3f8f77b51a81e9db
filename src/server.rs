// ABOUTME: HTTP server assembly, shared resource container, and CORS setup
// ABOUTME: Wires config, database, LLM provider, and generators into the axum app
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Assembly
//!
//! Builds the shared [`ServerResources`] container once at startup and serves
//! the HTTP API. The non-streaming generation endpoint uses the strategy
//! selected by `GENERATION_STRATEGY`; the SSE endpoint always streams through
//! the single-shot generator.

use crate::config::{GenerationStrategy, HttpConfig, ServerConfig};
use crate::database::{Database, ProgramStore};
use crate::errors::{AppError, AppResult};
use crate::generation::sequential::SequentialProgramGenerator;
use crate::generation::single_shot::SingleShotProgramGenerator;
use crate::generation::ProgramGenerator;
use crate::llm::LlmProvider;
use crate::routes::{HealthRoutes, ProgramRoutes};
use axum::Router;
use http::{header::HeaderName, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Centralized resource container for dependency injection
///
/// Holds all shared server resources so route handlers never recreate
/// expensive objects like the database pool or the LLM client.
#[derive(Clone)]
pub struct ServerResources {
    /// Database manager owning the connection pool
    pub database: Database,
    /// Program storage operations
    pub program_store: ProgramStore,
    /// Strategy serving non-streaming generation requests
    pub program_generator: Arc<dyn ProgramGenerator>,
    /// Streaming generator backing the SSE endpoint
    pub single_shot: Arc<SingleShotProgramGenerator>,
    /// LLM provider behind both strategies
    pub llm_provider: Arc<dyn LlmProvider>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Assemble shared resources, selecting the configured generation strategy
    #[must_use]
    pub fn new(
        database: Database,
        llm_provider: Arc<dyn LlmProvider>,
        config: Arc<ServerConfig>,
    ) -> Self {
        let program_store = ProgramStore::new(database.pool().clone());
        let single_shot = Arc::new(SingleShotProgramGenerator::new(
            llm_provider.clone(),
            config.generation.clone(),
        ));
        let program_generator: Arc<dyn ProgramGenerator> = match config.generation.strategy {
            GenerationStrategy::Sequential => Arc::new(SequentialProgramGenerator::new(
                llm_provider.clone(),
                config.generation.clone(),
            )),
            GenerationStrategy::SingleShot => single_shot.clone(),
        };

        Self {
            database,
            program_store,
            program_generator,
            single_shot,
            llm_provider,
            config,
        }
    }
}

/// The program engine HTTP server
pub struct ProgramServer {
    resources: Arc<ServerResources>,
}

impl ProgramServer {
    /// Create a server around already-assembled resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the full application router
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .merge(ProgramRoutes::routes(self.resources.clone()))
            .merge(HealthRoutes::routes(self.resources.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(setup_cors(&self.resources.config.http))
    }

    /// Bind the configured port and serve until the process is stopped
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails
    /// while running.
    pub async fn run(self) -> AppResult<()> {
        let port = self.resources.config.http.port;
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind port {port}: {e}")))?;

        info!("HTTP server listening on http://{addr}");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| AppError::internal(format!("HTTP server failed: {e}")))
    }
}

/// Configure CORS from the comma-separated origin list
///
/// A list containing `*` (or an empty list) allows any origin; otherwise
/// only the listed origins are permitted.
fn setup_cors(http: &HttpConfig) -> CorsLayer {
    let allow_origin = if http.cors_origins.is_empty()
        || http.cors_origins.iter().any(|origin| origin == "*")
    {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = http
            .cors_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();

        if origins.is_empty() {
            // Fallback to any if parsing failed
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("access-control-request-method"),
            HeaderName::from_static("access-control-request-headers"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_wildcard_allows_any_origin() {
        let http = HttpConfig {
            port: 8081,
            cors_origins: vec!["*".to_owned()],
        };
        // Building the layer must not panic for wildcard or explicit lists
        let _wildcard = setup_cors(&http);

        let http = HttpConfig {
            port: 8081,
            cors_origins: vec!["https://app.example.com".to_owned()],
        };
        let _explicit = setup_cors(&http);
    }
}
