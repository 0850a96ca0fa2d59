//! Release resolution
//!
//! Turns a version token into a concrete [`ReleaseDescriptor`] using the
//! Adoptium index, with results memoized by [`ReleaseMetadataCache`].

pub mod cache;
pub mod descriptor;
pub mod index;
pub mod version;

pub use cache::ReleaseMetadataCache;
pub use descriptor::{ReleaseCacheKey, ReleaseDescriptor};
pub use index::{AdoptiumIndex, IndexQuery};
pub use version::{compare_build, JavaVersion, ReleaseChannel, VersionAliases, VersionQuery};
