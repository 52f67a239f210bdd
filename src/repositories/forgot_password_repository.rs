//! PostgreSQL storage for password-reset OTPs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::database::models::{ForgotPassword, FromRow};
use crate::repositories::ForgotPasswordRepository;

#[derive(Debug, Clone)]
pub struct PgForgotPasswordRepository {
    pool: Pool,
}

impl PgForgotPasswordRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ForgotPasswordRepository for PgForgotPasswordRepository {
    async fn save(&self, record: ForgotPassword) -> Result<ForgotPassword> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        // One outstanding OTP per user: a new one replaces the old
        let row = client
            .query_one(
                "INSERT INTO forgot_password (otp, expiration_time, user_id) VALUES ($1, $2, $3) \
                 ON CONFLICT (user_id) DO UPDATE SET otp = EXCLUDED.otp, expiration_time = EXCLUDED.expiration_time \
                 RETURNING fpid, otp, expiration_time, user_id",
                &[&record.otp, &record.expiration_time, &record.user_id],
            )
            .await
            .context("Failed to store OTP")?;
        Ok(ForgotPassword::from_row(&row)?)
    }

    async fn find_by_otp_and_user(&self, otp: i32, user_id: i32) -> Result<Option<ForgotPassword>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt(
                "SELECT fpid, otp, expiration_time, user_id FROM forgot_password \
                 WHERE otp = $1 AND user_id = $2",
                &[&otp, &user_id],
            )
            .await
            .context("Failed to query OTP")?;
        Ok(row.map(|r| ForgotPassword::from_row(&r)).transpose()?)
    }

    async fn delete(&self, fpid: i32) -> Result<()> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        client
            .execute("DELETE FROM forgot_password WHERE fpid = $1", &[&fpid])
            .await
            .context("Failed to delete OTP")?;
        Ok(())
    }

    async fn delete_for_user(&self, user_id: i32) -> Result<()> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        client
            .execute("DELETE FROM forgot_password WHERE user_id = $1", &[&user_id])
            .await
            .context("Failed to delete OTPs for user")?;
        Ok(())
    }
}
