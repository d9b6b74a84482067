//! # leaddocs-client
//!
//! The Documents API collaborator. [`DocumentsApi`] is the seam the
//! document store talks through; [`HttpDocumentsApi`] speaks the CRM's REST
//! endpoints and, with the `memory` feature, [`InMemoryDocumentsApi`] keeps
//! per-lead trees in process for tests and offline use.

pub mod api;
pub mod http;
#[cfg(feature = "memory")]
pub mod memory;

pub use api::DocumentsApi;
pub use http::HttpDocumentsApi;
#[cfg(feature = "memory")]
pub use memory::InMemoryDocumentsApi;
