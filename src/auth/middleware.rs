//! Authentication Middleware
//!
//! Axum middleware for JWT token validation and role checks.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{jwt::JwtService, models::AuthUser};
use crate::error::AppError;

/// Authentication middleware that validates JWT tokens and injects user info
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Middleware function for validating JWT tokens
    pub async fn validate_token(
        State(jwt_service): State<Arc<JwtService>>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, AppError> {
        tracing::debug!("[AuthMiddleware] Incoming request: {} {}", req.method(), req.uri());

        let token = extract_token(&req).ok_or_else(|| {
            tracing::warn!("[AuthMiddleware] Missing Authorization header and access_token cookie");
            AppError::Unauthorized("Missing access token".to_string())
        })?;

        let claims = match jwt_service.decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("[AuthMiddleware] JWT validation failed: {:?}", e);
                return Err(AppError::Unauthorized("Invalid or expired access token".to_string()));
            }
        };

        let auth_user = AuthUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        };
        tracing::debug!("[AuthMiddleware] AuthUser injected: id={}, role={}", auth_user.id, auth_user.role);

        req.extensions_mut().insert(auth_user);

        Ok(next.run(req).await)
    }

    /// Must run after `validate_token`; rejects non-admin users with 403
    pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
        let user = req.require_auth()?;
        if !user.is_admin() {
            tracing::warn!("[AuthMiddleware] User {} denied admin route {}", user.id, req.uri());
            return Err(AppError::Forbidden);
        }
        Ok(next.run(req).await)
    }
}

/// Bearer header first, then the `access_token` cookie
fn extract_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|auth_header| auth_header.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .or_else(|| {
            req.headers()
                .get(header::COOKIE)
                .and_then(|cookie_header| cookie_header.to_str().ok())
                .and_then(|cookie_str| {
                    cookie_str
                        .split(';')
                        .map(str::trim)
                        .find_map(|cookie| cookie.strip_prefix("access_token="))
                        .map(String::from)
                })
        })
        .filter(|token| !token.is_empty())
}

/// Extension trait for extracting AuthUser from request
pub trait RequestAuthExt {
    fn auth_user(&self) -> Option<&AuthUser>;
    fn require_auth(&self) -> Result<&AuthUser, AppError>;
}

impl RequestAuthExt for Request {
    fn auth_user(&self) -> Option<&AuthUser> {
        self.extensions().get::<AuthUser>()
    }

    fn require_auth(&self) -> Result<&AuthUser, AppError> {
        self.auth_user()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
