//! CLI command implementations

pub mod build;
pub mod cache;
pub mod config;
pub mod releases;
pub mod serve;

pub use build::execute as build;
pub use cache::execute as cache;
pub use config::execute as config;
pub use releases::execute as releases;
pub use serve::execute as serve;
