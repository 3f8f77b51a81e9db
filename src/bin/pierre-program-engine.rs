// ABOUTME: Server binary for AI-powered training program generation
// ABOUTME: Boots configuration, database, LLM provider, and the HTTP surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![recursion_limit = "256"]

//! # Pierre Program Engine Server Binary
//!
//! This binary starts the program generation engine with prompt sanitization,
//! sequential and streaming generation strategies, and program persistence.

use anyhow::{Context, Result};
use clap::Parser;
use pierre_program_engine::{
    config::environment::ServerConfig,
    database::Database,
    llm::{ChatProvider, LlmProvider},
    logging,
    server::{ProgramServer, ServerResources},
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pierre-program-engine")]
#[command(about = "Pierre Program Engine - AI training program generation service")]
pub struct Args {
    /// Configuration file path (.env format)
    #[arg(short, long)]
    config: Option<String>,

    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle Docker environment where clap may not work properly
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using default configuration for production mode");
            // Default to production mode if argument parsing fails
            Args {
                config: None,
                http_port: None,
            }
        }
    };

    // Load environment overrides from an explicit file when provided
    if let Some(path) = &args.config {
        dotenvy::from_path(path)
            .with_context(|| format!("Failed to load configuration file {path}"))?;
    }

    // Load configuration from environment
    let mut config = ServerConfig::from_env()?;

    // Override port if specified
    if let Some(http_port) = args.http_port {
        config.http.port = http_port;
    }

    // Initialize production logging
    logging::init_from_env()?;

    info!("Starting Pierre Program Engine - Production Mode");
    info!("{}", config.summary());

    // Initialize database and run migrations
    let database = Database::connect(&config.database).await?;
    info!(
        "Database initialized successfully: {}",
        config.database.url.to_connection_string()
    );

    // Select the LLM backend from environment
    let llm_provider: Arc<dyn LlmProvider> = Arc::new(ChatProvider::from_env()?);
    info!(
        "LLM provider ready: {} (default model: {})",
        llm_provider.display_name(),
        llm_provider.default_model()
    );

    // Create server resources and server
    let resources = Arc::new(ServerResources::new(
        database,
        llm_provider,
        Arc::new(config.clone()),
    ));
    let server = ProgramServer::new(resources);

    info!("Server starting on port {}", config.http.port);

    // Display all available API endpoints
    display_available_endpoints(&config);

    info!("Ready to generate training programs!");

    // Run the server (includes all routes)
    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

/// Display all available API endpoints with their ports
fn display_available_endpoints(config: &ServerConfig) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());

    info!("=== Available API Endpoints ===");
    display_generation_endpoints(&host, config.http.port);
    display_library_endpoints(&host, config.http.port);
    display_monitoring_endpoints(&host, config.http.port);
    info!("=== End of Endpoint List ===");
}

#[allow(clippy::cognitive_complexity)]
fn display_generation_endpoints(host: &str, port: u16) {
    info!("Program Generation:");
    info!("   Generate Program:   POST http://{host}:{port}/api/programs/generate");
    info!("   Streaming Generate: POST http://{host}:{port}/api/programs/generate/stream");
}

#[allow(clippy::cognitive_complexity)]
fn display_library_endpoints(host: &str, port: u16) {
    info!("Program Library:");
    info!("   List Programs:      GET  http://{host}:{port}/api/programs?userId={{user_id}}");
    info!("   Get Program:        GET  http://{host}:{port}/api/programs/{{program_id}}");
    info!("   Delete Program:     DELETE http://{host}:{port}/api/programs/{{program_id}}");
}

#[allow(clippy::cognitive_complexity)]
fn display_monitoring_endpoints(host: &str, port: u16) {
    info!("Monitoring:");
    info!("   Health Check:       GET  http://{host}:{port}/health");
    info!("   Readiness Probe:    GET  http://{host}:{port}/ready");
}
