//! Command implementations.

mod run;
mod validate;

pub use run::run_forwarder;
pub use validate::run_validate;
