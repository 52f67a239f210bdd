//! # Services Module
//!
//! Business logic for the movie catalog and the account flows around it.

pub mod movie_service;
pub mod auth_service;
pub mod forgot_password_service;
pub mod email_service;

pub use auth_service::AuthService;
pub use forgot_password_service::ForgotPasswordService;
pub use movie_service::MovieService;
