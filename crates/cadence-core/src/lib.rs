//! Cadence core types.
//!
//! The data model shared by the recurrence engine, the ICS boundary and the
//! command-line front end: recurrence rules, parent events with their sparse
//! exception sets, materialized virtual instances and query windows.

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod rule;
pub mod types;
pub mod window;
