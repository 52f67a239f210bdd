//! # Authentication Module
//!
//! Handles JWT access tokens, password hashing, and middleware for securing API
//! endpoints. Mutating movie endpoints require an authenticated ADMIN user.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
