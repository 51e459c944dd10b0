//! Submit acceptance x efficiency simulations anchored to real runs to the Grid
//!
//! A [`submitter::Submitter`] instantiates the simulation templates, generates the JDL files,
//! makes OCDB snapshots, uploads everything to the grid, then submits one simulation job per
//! run and later the AOD merging jobs.

pub mod config;
pub mod db;
pub mod error;
pub mod grid;
pub mod jdl;
pub mod mode;
pub mod plan;
pub mod runs;
pub mod submitter;
pub mod template;
pub mod tools;
