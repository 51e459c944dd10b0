//! Runs the simulation is anchored to, and their trigger scalers

/// Ordered list of run numbers
pub mod list;

/// Per run trigger counts used to size the simulation
pub mod scalers;

pub type RunNumber = u32;
