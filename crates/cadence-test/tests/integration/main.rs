//! Cross-crate integration tests for the recurrence engine.

mod cli_documents;
mod edit_flow;
mod helpers;
mod scenarios;
