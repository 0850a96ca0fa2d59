//! jlink-online - minimized Java runtime images on demand
//!
//! Resolves Adoptium releases, caches extracted base runtimes, downloads
//! Maven artifacts and runs jlink to produce a runtime containing only the
//! requested modules.

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod jlink;
pub mod maven;
pub mod platform;
pub mod release;
pub mod request;
pub mod runtime;
pub mod server;
pub mod service;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use error::{JlinkError, JlinkResult};
