//! Upload module
//!
//! Turns a batch of uploaded files into stored pages, one independent
//! outcome per file.

mod coordinator;
mod types;

pub use coordinator::UploadCoordinator;
pub use types::*;
