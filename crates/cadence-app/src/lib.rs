//! Command-line front end for the Cadence recurrence engine.

pub mod cmd;
pub mod input;
