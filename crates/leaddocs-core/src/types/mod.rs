//! Core type definitions used across the LeadDocs workspace.

pub mod id;

pub use id::*;
