//! PostgreSQL storage for refresh tokens.

use anyhow::{Context, Result};
use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::database::models::{FromRow, RefreshToken};
use crate::repositories::RefreshTokenRepository;

#[derive(Debug, Clone)]
pub struct PgRefreshTokenRepository {
    pool: Pool,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_one(
                "INSERT INTO refresh_tokens (refresh_token, expiration_time, user_id) VALUES ($1, $2, $3) \
                 ON CONFLICT (user_id) DO UPDATE SET refresh_token = EXCLUDED.refresh_token, \
                 expiration_time = EXCLUDED.expiration_time \
                 RETURNING token_id, refresh_token, expiration_time, user_id",
                &[&token.refresh_token, &token.expiration_time, &token.user_id],
            )
            .await
            .context("Failed to store refresh token")?;
        Ok(RefreshToken::from_row(&row)?)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt(
                "SELECT token_id, refresh_token, expiration_time, user_id FROM refresh_tokens \
                 WHERE refresh_token = $1",
                &[&token],
            )
            .await
            .context("Failed to query refresh token")?;
        Ok(row.map(|r| RefreshToken::from_row(&r)).transpose()?)
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Option<RefreshToken>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt(
                "SELECT token_id, refresh_token, expiration_time, user_id FROM refresh_tokens \
                 WHERE user_id = $1",
                &[&user_id],
            )
            .await
            .context("Failed to query refresh token by user")?;
        Ok(row.map(|r| RefreshToken::from_row(&r)).transpose()?)
    }

    async fn delete(&self, token_id: i32) -> Result<()> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        client
            .execute("DELETE FROM refresh_tokens WHERE token_id = $1", &[&token_id])
            .await
            .context("Failed to delete refresh token")?;
        Ok(())
    }
}
