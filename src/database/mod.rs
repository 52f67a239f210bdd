//! # Database Module
//!
//! PostgreSQL integration using tokio-postgres with a deadpool connection pool.
//! Includes connection management, row models, and migrations.

pub mod connection;
pub mod models;
pub mod migrations;

pub use connection::{DatabaseConnection, DatabaseConfig};
