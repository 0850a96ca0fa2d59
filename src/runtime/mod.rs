//! Base runtime storage
//!
//! Downloads release archives once, extracts them into the runtime cache and
//! hands out their roots for linking.

pub mod archive;
pub mod store;

pub use archive::ArchiveFormat;
pub use store::{CachedRuntime, LocalRuntime, RuntimeStore};
