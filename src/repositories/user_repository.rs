//! PostgreSQL storage for user accounts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::database::models::{FromRow, NewUser, User};
use crate::repositories::UserRepository;

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_one(
                "INSERT INTO users (name, email, username, password, role) VALUES ($1, $2, $3, $4, $5) \
                 RETURNING user_id, name, email, username, password, role",
                &[
                    &user.name,
                    &user.email,
                    &user.username,
                    &user.password_hash,
                    &user.role.as_str(),
                ],
            )
            .await
            .context("Failed to insert user")?;
        Ok(User::from_row(&row)?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt("SELECT * FROM users WHERE email = $1", &[&email])
            .await
            .context("Failed to query user by email")?;
        Ok(row.map(|r| User::from_row(&r)).transpose()?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt("SELECT * FROM users WHERE username = $1", &[&username])
            .await
            .context("Failed to query user by username")?;
        Ok(row.map(|r| User::from_row(&r)).transpose()?)
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<User>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt("SELECT * FROM users WHERE user_id = $1", &[&user_id])
            .await
            .context("Failed to query user by id")?;
        Ok(row.map(|r| User::from_row(&r)).transpose()?)
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<u64> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let n = client
            .execute(
                "UPDATE users SET password = $2 WHERE email = $1",
                &[&email, &password_hash],
            )
            .await
            .context("Failed to update password")?;
        Ok(n)
    }
}
