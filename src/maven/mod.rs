//! Maven repository integration
//!
//! Artifacts named in a request are downloaded together with their
//! transitive, non-test dependencies and added to the jlink module path.

pub mod coordinate;
pub mod pom;
pub mod resolver;

pub use coordinate::ArtifactCoordinate;
pub use resolver::DependencyResolver;
