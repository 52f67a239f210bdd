// Database Models
//
// Tokio-postgres compatible models for the movie catalog and the auth tables.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use crate::error::{AppError, AppResult};

/// Trait for converting from tokio-postgres Row
pub trait FromRow {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error>
    where
        Self: Sized;
}

// ============================================================================
// MOVIE MODELS
// ============================================================================

/// Client-editable movie fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    pub title: String,
    pub director: String,
    pub studio: String,
    #[serde(default)]
    pub movie_cast: BTreeSet<String>,
    pub release_year: i32,
}

impl MovieDetails {
    /// Reject blank title, director or studio
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            (&self.title, "Please provide movie's title!"),
            (&self.director, "Please provide movie's director!"),
            (&self.studio, "Please provide movie's studio!"),
        ];
        for (value, message) in required {
            if value.trim().is_empty() {
                return Err(AppError::Validation(message.to_string()));
            }
        }
        Ok(())
    }
}

/// Movie record. `movie_id` stays `None` until storage assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub movie_id: Option<i32>,
    #[serde(flatten)]
    pub details: MovieDetails,
    pub poster: String,
}

impl Movie {
    pub fn new(details: MovieDetails, poster: String) -> Self {
        Self {
            movie_id: None,
            details,
            poster,
        }
    }
}

impl FromRow for Movie {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        let cast: Vec<String> = row.try_get("movie_cast")?;
        Ok(Self {
            movie_id: Some(row.try_get("movie_id")?),
            details: MovieDetails {
                title: row.try_get("title")?,
                director: row.try_get("director")?,
                studio: row.try_get("studio")?,
                movie_cast: cast.into_iter().collect(),
                release_year: row.try_get("release_year")?,
            },
            poster: row.try_get("poster")?,
        })
    }
}

// ============================================================================
// USER & AUTH MODELS
// ============================================================================

/// Authorization role attached to every user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => anyhow::bail!("Unknown role '{}'", other),
        }
    }
}

/// User account information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub username: String,
    /// Argon2 PHC hash, never the plaintext
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
}

impl FromRow for User {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        let role: String = row.try_get("role")?;
        Ok(Self {
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            password: row.try_get("password")?,
            // Unknown role strings degrade to the least privileged role
            role: role.parse().unwrap_or(Role::User),
        })
    }
}

/// Fields needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// One-time password issued for a password reset
#[derive(Debug, Clone)]
pub struct ForgotPassword {
    pub fpid: Option<i32>,
    pub otp: i32,
    pub expiration_time: DateTime<Utc>,
    pub user_id: i32,
}

impl ForgotPassword {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_time < now
    }
}

impl FromRow for ForgotPassword {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            fpid: Some(row.try_get("fpid")?),
            otp: row.try_get("otp")?,
            expiration_time: row.try_get("expiration_time")?,
            user_id: row.try_get("user_id")?,
        })
    }
}

/// Long-lived refresh token bound to a single user
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub token_id: Option<i32>,
    pub refresh_token: String,
    pub expiration_time: DateTime<Utc>,
    pub user_id: i32,
}

impl RefreshToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_time < now
    }
}

impl FromRow for RefreshToken {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            token_id: Some(row.try_get("token_id")?),
            refresh_token: row.try_get("refresh_token")?,
            expiration_time: row.try_get("expiration_time")?,
            user_id: row.try_get("user_id")?,
        })
    }
}
