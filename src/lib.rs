//! LexCase Core - Case Management Backend
//!
//! This crate provides the permission evaluation engine for the LexCase
//! case-management platform: grant-layer aggregation, persona capability
//! validation, visibility resolution, and batch grant/revoke orchestration.
//! Transport handlers, search, and identity issuance live outside this crate
//! and call in through [`policy::PermissionEngine`] and
//! [`service::GrantBatchService`].

pub mod config;
pub mod domain;
pub mod error;
pub mod policy;
pub mod repository;
pub mod service;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
