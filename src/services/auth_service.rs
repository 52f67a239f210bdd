//! # Auth Service
//!
//! Registration, login and refresh-token exchange. Access tokens are short-lived
//! JWTs; refresh tokens are opaque UUIDs stored per user.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::jwt::JwtService;
use crate::auth::models::{
    normalize_email, AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest,
};
use crate::auth::password::{hash_password, verify_password};
use crate::database::models::{NewUser, RefreshToken, Role, User};
use crate::error::{AppError, AppResult};
use crate::repositories::{RefreshTokenRepository, UserRepository};

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    jwt: Arc<JwtService>,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        jwt: Arc<JwtService>,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            jwt,
            refresh_ttl,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        let username = request.username.trim().to_string();
        if email.is_empty() || request.password.is_empty() {
            return Err(AppError::Validation("Email and password are required".to_string()));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailAlreadyRegistered(email));
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::UsernameAlreadyTaken(username));
        }

        let user = self
            .users
            .insert(NewUser {
                name: request.name.trim().to_string(),
                username,
                email,
                password_hash: hash_password(&request.password)?,
                role: Role::User,
            })
            .await?;
        tracing::info!(user_id = user.user_id, "Registered user");

        self.issue_tokens(&user).await
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password)? {
            tracing::warn!(user_id = user.user_id, "Rejected login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        self.issue_tokens(&user).await
    }

    /// Exchange a refresh token for a new access token; the refresh token is returned unchanged
    pub async fn refresh(&self, request: RefreshTokenRequest) -> AppResult<AuthResponse> {
        let stored = self
            .refresh_tokens
            .find_by_token(&request.refresh_token)
            .await?
            .ok_or(AppError::RefreshTokenNotFound)?;

        if stored.is_expired_at(Utc::now()) {
            if let Some(token_id) = stored.token_id {
                self.refresh_tokens.delete(token_id).await?;
            }
            return Err(AppError::RefreshTokenExpired);
        }

        let user = self
            .users
            .find_by_id(stored.user_id)
            .await?
            .ok_or(AppError::RefreshTokenNotFound)?;

        Ok(AuthResponse {
            access_token: self.jwt.create_token(&user)?,
            refresh_token: stored.refresh_token,
        })
    }

    async fn issue_tokens(&self, user: &User) -> AppResult<AuthResponse> {
        let refresh_token = self.refresh_token_for(user).await?;
        Ok(AuthResponse {
            access_token: self.jwt.create_token(user)?,
            refresh_token: refresh_token.refresh_token,
        })
    }

    /// Reuse the user's refresh token while it is valid, otherwise mint a new one
    async fn refresh_token_for(&self, user: &User) -> AppResult<RefreshToken> {
        let now = Utc::now();
        if let Some(existing) = self.refresh_tokens.find_by_user(user.user_id).await? {
            if !existing.is_expired_at(now) {
                return Ok(existing);
            }
        }

        let token = self
            .refresh_tokens
            .save(RefreshToken {
                token_id: None,
                refresh_token: Uuid::new_v4().to_string(),
                expiration_time: now + self.refresh_ttl,
                user_id: user.user_id,
            })
            .await?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::{InMemoryRefreshTokenRepository, InMemoryUserRepository};

    struct Fixture {
        refresh_tokens: Arc<InMemoryRefreshTokenRepository>,
        jwt: Arc<JwtService>,
        service: AuthService,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::default());
        let refresh_tokens = Arc::new(InMemoryRefreshTokenRepository::default());
        let jwt = Arc::new(JwtService::new("test_secret", Duration::minutes(25)));
        let service = AuthService::new(users, refresh_tokens.clone(), jwt.clone(), Duration::hours(1));
        Fixture {
            refresh_tokens,
            jwt,
            service,
        }
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Paul".to_string(),
            email: email.to_string(),
            username: email.split('@').next().unwrap_or("user").to_string(),
            password: "arrakis".to_string(),
        }
    }

    #[tokio::test]
    async fn register_issues_tokens_for_a_user_role() {
        let f = fixture();
        let response = f.service.register(register_request("Paul@Example.com")).await.unwrap();

        let claims = f.jwt.decode_claims(&response.access_token).unwrap();
        assert_eq!(claims.email, "paul@example.com");
        assert_eq!(claims.role, Role::User);
        assert!(!response.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let f = fixture();
        f.service.register(register_request("paul@example.com")).await.unwrap();
        let err = f.service.register(register_request("paul@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyRegistered(_)));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let f = fixture();
        let mut first = register_request("ann@example.com");
        first.username = "ann".to_string();
        f.service.register(first).await.unwrap();

        let mut second = register_request("other@example.com");
        second.username = "ann".to_string();
        let err = f.service.register(second).await.unwrap_err();
        assert!(matches!(err, AppError::UsernameAlreadyTaken(ref name) if name == "ann"));
        assert_eq!(err.status_and_code().1, "USERNAME_ALREADY_TAKEN");
        assert_eq!(f.refresh_tokens.len(), 1);
    }

    #[tokio::test]
    async fn login_checks_password_and_reuses_refresh_token() {
        let f = fixture();
        let registered = f.service.register(register_request("paul@example.com")).await.unwrap();

        let login = f
            .service
            .login(LoginRequest {
                email: "paul@example.com".to_string(),
                password: "arrakis".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.refresh_token, registered.refresh_token);
        assert_eq!(f.refresh_tokens.len(), 1);

        let err = f
            .service
            .login(LoginRequest {
                email: "paul@example.com".to_string(),
                password: "giedi".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        let err = f
            .service
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "arrakis".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn refresh_reissues_access_token_for_the_same_user() {
        let f = fixture();
        let registered = f.service.register(register_request("paul@example.com")).await.unwrap();
        let original = f.jwt.decode_claims(&registered.access_token).unwrap();

        let refreshed = f
            .service
            .refresh(RefreshTokenRequest {
                refresh_token: registered.refresh_token.clone(),
            })
            .await
            .unwrap();

        assert_eq!(refreshed.refresh_token, registered.refresh_token);
        assert_eq!(f.jwt.decode_claims(&refreshed.access_token).unwrap().sub, original.sub);
    }

    #[tokio::test]
    async fn unknown_or_expired_refresh_token_is_rejected() {
        let f = fixture();
        let err = f
            .service
            .refresh(RefreshTokenRequest {
                refresh_token: "not-a-token".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RefreshTokenNotFound));

        let registered = f.service.register(register_request("paul@example.com")).await.unwrap();
        f.refresh_tokens
            .set_expiration(&registered.refresh_token, Utc::now() - Duration::minutes(1));

        let err = f
            .service
            .refresh(RefreshTokenRequest {
                refresh_token: registered.refresh_token.clone(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RefreshTokenExpired));
        assert_eq!(f.refresh_tokens.len(), 0);
    }
}
