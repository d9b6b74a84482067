//! Core traits defined in `leaddocs-core` and implemented by other crates.

pub mod saver;

pub use saver::FileSaver;
