//! Shared types, errors, and configuration for Telbill.
//!
//! This crate provides common types used across all other crates:
//! - Billing period and pagination types
//! - JWT auth types and token service
//! - Application-wide error types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
