//! Shared types, errors, and configuration for Centavo.
//!
//! This crate provides common types used across all other crates:
//! - Integer-cents money type
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - JWT token handling
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
