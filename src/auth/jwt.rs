//! JWT Token Service
//!
//! Handles access-token creation, validation, and claims management for user authentication.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::database::models::{Role, User};

const ISSUER: &str = "movieflix-server";

/// JWT Claims structure containing user information and token metadata
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id
    pub sub: i32,
    /// User email
    pub email: String,
    pub role: Role,
    /// Token issued at timestamp
    pub iat: i64,
    /// Token expiration timestamp
    pub exp: i64,
    /// Token issuer
    pub iss: String,
}

/// JWT Service for token operations
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
}

impl JwtService {
    /// Create a new JWT service with the provided secret and access-token lifetime
    pub fn new(secret: &str, access_ttl: Duration) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);

        Self {
            encoding_key,
            decoding_key,
            validation,
            access_ttl,
        }
    }

    /// Generate an access token for a user
    pub fn create_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let expiration = now + self.access_ttl;

        let claims = Claims {
            sub: user.user_id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: ISSUER.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode JWT token")
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<TokenData<Claims>> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .context("Failed to validate JWT token")
    }

    pub fn decode_claims(&self, token: &str) -> Result<Claims> {
        let token_data = self.validate_token(token)?;
        Ok(token_data.claims)
    }
}
