//! Job recording, loading, and state updates
//!
//! Every submission to the grid queue adds a row with the JDL, its arguments and the job ID the
//! grid replied with. Rows are later refreshed with the state the grid reports for the job.

pub mod record;
pub mod load;
pub mod update;
pub mod state;
