//! Submitter configuration
//!
//! Configuration files are JSON. They're validated against a bundled JSON schema before being
//! deserialised into [`settings::Settings`].

/// Typed configuration and its defaults
pub mod settings;

/// Read, validate and write configuration files
pub mod load;
