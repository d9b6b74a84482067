//! # leaddocs-entity
//!
//! Domain models for LeadDocs. Every struct in this crate is either a node
//! of a lead's document tree, a summary returned by the Documents API, or a
//! request payload sent to it. Wire types serialize with camelCase field
//! names to match the API's JSON.

pub mod document;
