//! Link-initialization and speed-negotiation control unit of a serial interconnect lane.
//!
//! The unit brings a lane from `Disabled` through cable discovery, capability exchange and
//! ordered-set training to `Active`. It consists of two independent synchronous processes sharing
//! one clock: the [`controller::Controller`] that owns the link phase, and the
//! [`arbiter::Arbiter`] that owns the transaction channel and only reads the phase. [`Lane`]
//! evaluates both on the same snapshot and commits them together.

#![deny(rust_2018_idioms)]
#![deny(missing_debug_implementations)]
#![deny(trivial_numeric_casts)]
#![deny(unused_import_braces)]

pub mod arbiter;
pub mod config_reader;
pub mod constants;
pub mod controller;
mod lane;
pub mod negotiation;
pub mod ordered_set;
pub mod params;
pub mod testbench;
pub mod types;

use linkflow::vcd::VcdError;
use linkflow::SignalError;
use thiserror::Error;

pub use lane::{Lane, LaneTrace};
pub use params::LaneParams;
pub use types::*;

/// Lane error.
#[derive(Debug, Error)]
pub enum LaneError {
    /// An ordered-set threshold does not fit the counter.
    #[error("ordered-set threshold {threshold} does not fit a {width}-bit counter")]
    Threshold { threshold: u64, width: usize },

    /// A bit position lies outside its word.
    #[error("{field} bit {bit} is outside the {width}-bit word")]
    BitPosition { field: &'static str, bit: usize, width: usize },

    /// The bench did not reach a phase in time.
    #[error("phase {phase:?} not reached within {ticks} ticks")]
    NotReached { phase: LinkPhase, ticks: u64 },

    /// A raw value does not fit its field.
    #[error("invalid parameter: {0}")]
    Signal(#[from] SignalError),

    /// Waveform dump failed.
    #[error("waveform dump failed: {0}")]
    Vcd(#[from] VcdError),

    /// File system error.
    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),
}
