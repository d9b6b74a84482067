//! Document tree entities.

pub mod file;
pub mod folder;
pub mod request;
pub mod stats;
pub mod structure;

pub use file::FileEntry;
pub use folder::Folder;
pub use request::{CreateFolderRequest, MoveFileRequest, UploadFile, UploadFilesRequest};
pub use stats::DocumentStats;
pub use structure::DocumentStructure;
