//! # leaddocs-store
//!
//! The client-held copy of a lead's document tree. [`DocumentStore`] routes
//! every change through the Documents API first and then applies an
//! equivalent update to its local tree, publishing a fresh root on each
//! mutation so observers can compare roots by pointer.
//!
//! The mutation algorithms live in [`tree`]; the store is the only caller.

pub mod saver;
pub mod state;
pub mod store;
pub mod tree;

pub use saver::DirectorySaver;
pub use state::StoreState;
pub use store::DocumentStore;
pub use tree::LocalUpdate;
