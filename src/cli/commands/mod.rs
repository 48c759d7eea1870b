//! CLI commands implementation.

mod keywords;
mod run;

pub use keywords::cmd_keywords;
pub use run::{cmd_run, RunArgs};
