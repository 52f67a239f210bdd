//! Password reset routes: mail an OTP, verify it, then change the password.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};

use crate::auth::models::ChangePassword;
use crate::error::AppResult;
use crate::server::AppState;

/// POST /forgotPassword/verifyMail/{email}
pub async fn verify_mail(
    State(app_state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<String> {
    app_state.forgot_password_service.verify_mail(&email).await
}

/// POST /forgotPassword/verifyOtp/{otp}/{email}
pub async fn verify_otp(
    State(app_state): State<AppState>,
    Path((otp, email)): Path<(i32, String)>,
) -> AppResult<String> {
    app_state.forgot_password_service.verify_otp(otp, &email).await
}

/// POST /forgotPassword/changePassword/{email}
pub async fn change_password(
    State(app_state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<ChangePassword>,
) -> AppResult<String> {
    app_state
        .forgot_password_service
        .change_password(&email, payload)
        .await
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/forgotPassword/verifyMail/{email}", post(verify_mail))
        .route("/forgotPassword/verifyOtp/{otp}/{email}", post(verify_otp))
        .route("/forgotPassword/changePassword/{email}", post(change_password))
}
