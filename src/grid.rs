//! Remote grid storage and job queue
//!
//! Everything that talks to the grid goes through the [`client::GridClient`] trait, so the
//! submitter can run against the alien command line tools or an in-memory fake.

/// The client interface and the records it returns
pub mod client;

/// Client implementation shelling out to the alien command line tools
pub mod alien;

/// Existence checks and merging stage discovery built on directory listings
pub mod remote;
