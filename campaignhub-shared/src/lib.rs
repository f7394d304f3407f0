//! # CampaignHub Shared Library
//!
//! Data layer and business logic behind the CampaignHub API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `models`: Database models and their queries
//! - `services`: Per-resource business logic (users, campaigns, waitlist)
//! - `validation`: Stateless input checks
//! - `error`: Service error taxonomy

pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod validation;

pub use error::{ServiceError, ServiceResult};

/// Current version of the CampaignHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
