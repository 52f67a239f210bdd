//! # Server Module
//!
//! HTTP server setup and route configuration for the MovieFlix server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use chrono::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{jwt::JwtService, middleware::AuthMiddleware};
use crate::config::Config;
use crate::database::{migrations::run_migrations, DatabaseConfig, DatabaseConnection};
use crate::repositories::{
    PgForgotPasswordRepository, PgMovieRepository, PgRefreshTokenRepository, PgUserRepository,
};
use crate::routes::{auth, file, forgot_password, health::ping, movie};
use crate::services::email_service::{LogMailer, Mailer, SmtpMailer};
use crate::services::{AuthService, ForgotPasswordService, MovieService};
use crate::storage::{FileStore, LocalFileStore};

/// Upper bound for multipart bodies carrying a poster
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub movie_service: Arc<MovieService>,
    pub auth_service: Arc<AuthService>,
    pub forgot_password_service: Arc<ForgotPasswordService>,
    pub jwt_service: Arc<JwtService>,
    pub file_store: Arc<dyn FileStore>,
    pub poster_dir: PathBuf,
}

/// Assemble the full router. Mutating catalog and upload routes require an
/// admin access token; everything else is public.
pub fn build_router(app_state: AppState, cors_origins: &[String]) -> Router {
    // route_layer: the last layer added runs first, so the token is decoded
    // before the role check
    let admin_routes = Router::new()
        .merge(movie::admin_routes())
        .merge(file::admin_routes())
        .route_layer(middleware::from_fn(AuthMiddleware::require_admin))
        .route_layer(middleware::from_fn_with_state(
            app_state.jwt_service.clone(),
            AuthMiddleware::validate_token,
        ));

    Router::new()
        .route("/ping", get(ping)) // Health check endpoint
        .merge(movie::public_routes())
        .merge(file::public_routes())
        .merge(auth::create_auth_routes())
        .merge(forgot_password::create_routes())
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(app_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Skipping invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .allow_credentials(true) // Allow cookies for auth
}

/// Starts the MovieFlix HTTP server.
///
/// Connects to Postgres, applies pending migrations, wires the services and
/// serves until the process is terminated.
pub async fn start(config: Config) -> anyhow::Result<()> {
    let db_config = DatabaseConfig::from_settings(&config.database)?;
    let db = DatabaseConnection::new(db_config).await?;
    run_migrations(db.pool()).await?;
    let pool = db.pool().clone();

    let jwt_service = Arc::new(JwtService::new(
        &config.auth.jwt_secret,
        Duration::minutes(config.auth.access_token_ttl_minutes),
    ));

    let mailer: Arc<dyn Mailer> = match &config.mail {
        Some(mail) => {
            tracing::info!("Sending mail through SMTP relay {}", mail.smtp_host);
            Arc::new(SmtpMailer::new(mail)?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, password reset mails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let file_store: Arc<dyn FileStore> = Arc::new(LocalFileStore::new());
    let users = Arc::new(PgUserRepository::new(pool.clone()));

    let app_state = AppState {
        movie_service: Arc::new(MovieService::new(
            Arc::new(PgMovieRepository::new(pool.clone())),
            file_store.clone(),
            config.storage.poster_dir.clone(),
            config.storage.base_url.clone(),
        )),
        auth_service: Arc::new(AuthService::new(
            users.clone(),
            Arc::new(PgRefreshTokenRepository::new(pool.clone())),
            jwt_service.clone(),
            Duration::hours(config.auth.refresh_token_ttl_hours),
        )),
        forgot_password_service: Arc::new(ForgotPasswordService::new(
            users,
            Arc::new(PgForgotPasswordRepository::new(pool)),
            mailer,
            Duration::seconds(config.auth.otp_ttl_seconds),
        )),
        jwt_service,
        file_store,
        poster_dir: config.storage.poster_dir.clone(),
    };

    let app = build_router(app_state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr} - port may already be in use"))?;

    tracing::info!("🚀 MovieFlix Server starting...");
    tracing::info!("📡 Listening on http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/ping", addr);
    tracing::info!("🎬 Movie endpoints available at http://{}/api/v1/movie/*", addr);
    tracing::info!("🖼️  Posters stored in {}", config.storage.poster_dir.display());

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
