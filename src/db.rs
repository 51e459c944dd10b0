//! Submitted jobs are recorded in a SQLite database in the local directory

/// Connect to a SQLite database
pub mod open;
pub mod job;
