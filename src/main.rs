//! # MovieFlix Server
//!
//! Movie catalog backend built with Rust, Axum, Tokio and Postgres.
//!
//! ## Features
//! - Movie CRUD with poster upload, paging and sorting
//! - Poster files stored on disk and served at `/file/{name}`
//! - JWT access tokens with refresh tokens, admin-only mutations
//! - OTP password reset over SMTP
//! - Structured logging with tracing
//!
//! ## Architecture
//! - `server`: Router assembly and startup
//! - `config`: Environment variable configuration
//! - `routes`: HTTP handlers per area
//! - `services`: Business logic
//! - `repositories`: Postgres persistence behind traits
//! - `storage`: Poster file storage
//! - `auth`: JWT, password hashing and middleware
//!
//! ## Environment Setup
//! Copy `.env.example` to `.env` and set at least `DATABASE_URL` and `JWT_SECRET`:
//! ```bash
//! cp .env.example .env
//! ```
//!
//! ## Health Check
//! ```bash
//! curl http://localhost:8080/ping
//! ```

mod auth;
mod config;
mod database;
mod dto;
mod error;
mod repositories;
mod routes;
mod server;
mod services;
mod storage;

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; variables may come from the environment
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false) // Don't show module targets for cleaner output
                .compact(),
        )
        .init();

    tracing::info!("🏁 Starting MovieFlix Server...");
    tracing::info!("📦 Package: {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "🏗️  Build profile: {}",
        if cfg!(debug_assertions) { "debug" } else { "release" }
    );

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server::start(config).await {
        tracing::error!("Server stopped: {:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
