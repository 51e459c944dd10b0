//! Variables and the template files that reference them
//!
//! Template files are copied from the template directory to the local directory. Any token
//! starting with `VAR_` in a copied file is replaced by its value from the [`vars::VariableStore`].

/// Named replacement values, all starting with `VAR_`
pub mod vars;

/// Find and substitute `VAR_` tokens in files
pub mod replace;

pub const VAR_PREFIX: &str = "VAR_";
