//! Subcommands of the `cadence` binary.

pub mod boundary;
pub mod expand;
pub mod occurrence;
pub mod rrule;

use cadence_core::config::Settings;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Materialize the instances of one or more events over a window
    Expand(expand::ExpandArgs),
    /// Materialize a single occurrence by its original start
    Occurrence(occurrence::OccurrenceArgs),
    /// Compute the cached recurrence end of an event
    Boundary(boundary::BoundaryArgs),
    /// Export an event's rule as ICS text, or parse RRULE text
    Rrule(rrule::RruleArgs),
}

impl Commands {
    /// ## Summary
    /// Runs the subcommand and returns what it prints.
    ///
    /// ## Errors
    /// Returns input, configuration and engine errors.
    pub fn run(&self, settings: &Settings) -> anyhow::Result<String> {
        match self {
            Self::Expand(args) => expand::run_expand(args, settings),
            Self::Occurrence(args) => occurrence::run_occurrence(args),
            Self::Boundary(args) => boundary::run_boundary(args),
            Self::Rrule(args) => rrule::run_rrule(args),
        }
    }
}
