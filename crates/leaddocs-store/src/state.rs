//! Observable store state.

use std::sync::Arc;

use leaddocs_core::types::LeadId;
use leaddocs_entity::document::{DocumentStats, DocumentStructure};

/// Everything a view needs to render a lead's documents.
///
/// Cloning is cheap: the tree is shared behind an [`Arc`], and a new `Arc`
/// is installed on every local mutation, so `Arc::ptr_eq` on two snapshots
/// tells whether the tree changed in between.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// Lead the current tree belongs to.
    pub lead_id: Option<LeadId>,
    /// Current tree, `None` until a fetch succeeds.
    pub documents: Option<Arc<DocumentStructure>>,
    /// Last fetched summary.
    pub stats: Option<DocumentStats>,
    /// A fetch or a non-upload mutation is in flight.
    pub is_loading: bool,
    /// An upload is in flight.
    pub is_uploading: bool,
    /// Message of the most recent failure, shared by all operations.
    pub error: Option<String>,
}

impl StoreState {
    /// Whether the loaded tree belongs to `lead_id`.
    pub fn holds_lead(&self, lead_id: &LeadId) -> bool {
        self.documents.is_some() && self.lead_id.as_ref() == Some(lead_id)
    }
}
