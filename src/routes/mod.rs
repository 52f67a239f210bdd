// # Routes Module
//
// - This module contains all HTTP route handlers for the MovieFlix server.
// - Routes are organized by functionality into separate submodules and
//   assembled in `server.rs`.
//
// ## Available Route Modules
// - `health`: Health check endpoint
// - `movie`: Movie catalog CRUD and paging
// - `file`: Poster upload and download
// - `auth`: Registration, login and token refresh
// - `forgot_password`: OTP password reset

/// Health check endpoint
pub mod health;

/// Movie catalog endpoints
pub mod movie;

/// Poster file endpoints
pub mod file;

/// Registration, login and token refresh
pub mod auth;

/// OTP password reset endpoints
pub mod forgot_password;
