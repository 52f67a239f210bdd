//! Auth routes for registration, login and access-token refresh

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;

use crate::auth::models::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest};
use crate::error::AppResult;
use crate::server::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let tokens = app_state.auth_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

/// Returns the token pair and also sets the access token as a cookie, so
/// browser clients can call the admin routes without an Authorization header.
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let tokens = app_state.auth_service.login(payload).await?;
    let claims = app_state.jwt_service.decode_claims(&tokens.access_token)?;

    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, tokens.access_token.clone());
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::None); // cross origin
    cookie.set_path("/");
    // Expire with the JWT
    let max_age = claims.exp - Utc::now().timestamp();
    if max_age > 0 {
        cookie.set_max_age(time::Duration::seconds(max_age));
    }

    Ok((jar.add(cookie), Json(tokens)))
}

pub async fn refresh(
    State(app_state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> AppResult<Json<AuthResponse>> {
    Ok(Json(app_state.auth_service.refresh(payload).await?))
}

pub fn create_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/refresh", post(refresh))
}
