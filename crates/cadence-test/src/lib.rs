//! Cadence recurrence engine - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can reach
//! every layer through `cadence_test::component::` paths.

pub mod component {
    pub use cadence_core::*;

    pub mod engine {
        pub use cadence_engine::*;
    }

    pub mod ical {
        pub use cadence_rfc::error::*;
        pub use cadence_rfc::ical::*;
    }

    pub mod cli {
        pub use cadence_app::cmd::*;
        pub use cadence_app::input::*;
    }
}
