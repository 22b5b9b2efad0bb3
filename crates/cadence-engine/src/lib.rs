//! Cadence recurrence engine.
//!
//! Expands a parent event's recurrence rule over a query window, overlays
//! its stored exceptions and returns fully resolved virtual instances. Every
//! call works on an immutable snapshot supplied by the caller and performs no
//! I/O.

pub mod boundary;
pub mod clock;
pub mod edit;
pub mod error;
pub mod exceptions;
pub mod materialize;
pub mod overlay;
pub mod prefilter;

pub use boundary::compute_recurrence_end;
pub use clock::RuleClock;
pub use error::{EngineError, EngineResult};
pub use exceptions::ExceptionStore;
pub use materialize::{materialize, materialize_all, materialize_one};
pub use overlay::OverlayMerger;
