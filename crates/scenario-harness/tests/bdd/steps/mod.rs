//! BDD step definitions for the scenario harness

pub mod command_steps;
pub mod stash_steps;
