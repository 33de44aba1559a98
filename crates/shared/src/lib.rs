//! Shared types, errors, and configuration for Bukubesar.
//!
//! This crate provides common types used across all other crates:
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - Bearer token claims and validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::AppError;
pub use jwt::{JwtError, JwtService};
pub use types::{PageMeta, PageRequest, PageResponse};
