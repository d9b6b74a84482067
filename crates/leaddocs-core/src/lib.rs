//! # leaddocs-core
//!
//! Core crate for LeadDocs. Contains the configuration schemas, typed
//! identifiers, the download sink trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other LeadDocs crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
