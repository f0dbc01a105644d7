//! Simulation environment of a lane.
//!
//! [`FarEnd`] models everything on the other side of the lane's ports: the minimum-disabled timer,
//! the cable's config space, the transaction layer answering the fetch, and a physical layer whose
//! partner mirrors the ordered sets it is sent. [`Bench`] closes the loop, feeding each tick's
//! registered outputs back into the next tick's inputs.

use linkflow::*;
use tracing::{debug, info};

use crate::config_reader::CableProperties;
use crate::lane::{Lane, LaneTrace};
use crate::params::LaneParams;
use crate::types::{Generation, LaneInput, LaneOutput, LinkPhase, Transaction, TransKind};
use crate::LaneError;

/// Far end of a lane.
#[derive(Debug, Clone)]
pub struct FarEnd {
    /// Generation advertised by the cable.
    pub cable: Generation,
    /// Whether the cable carries the identity sentinel.
    pub cable_present: bool,
    /// Generation advertised by the partner's parameters.
    pub partner: Generation,
    /// Ticks with `disabled` asserted before the minimum-disabled pulse.
    pub min_disabled_ticks: u64,
    /// Ticks between the fetch selection and its completion.
    pub fetch_latency: u64,
    /// Number of fetches that complete with an error before one succeeds.
    pub failed_fetches: u32,
    /// Whether the partner mirrors the ordered sets it is sent.
    pub echo_ordered_sets: bool,
    /// Holds `busy` high.
    pub busy: bool,
    params: LaneParams,
    disabled_for: u64,
    fetch_due: Option<u64>,
}

impl FarEnd {
    pub fn new(cable: Generation, partner: Generation, params: LaneParams) -> Self {
        Self {
            cable,
            cable_present: true,
            partner,
            min_disabled_ticks: 4,
            fetch_latency: 2,
            failed_fetches: 0,
            echo_ordered_sets: true,
            busy: false,
            params,
            disabled_for: 0,
            fetch_due: None,
        }
    }

    fn complete_fetch(&mut self) -> Transaction {
        if self.failed_fetches > 0 {
            self.failed_fetches -= 1;
            debug!(remaining = self.failed_fetches, "fetch completed with error");
            return Transaction { valid: true, error: true, ..Default::default() };
        }
        Transaction { valid: true, data: self.params.partner_caps.encode(self.partner), ..Default::default() }
    }

    /// Inputs of the next tick, as a reaction to the lane's registered outputs.
    pub fn drive(&mut self, output: &LaneOutput) -> LaneInput {
        let mut input = LaneInput { busy: self.busy, ..Default::default() };

        self.disabled_for = if output.disabled { self.disabled_for + 1 } else { 0 };
        input.timeouts.min_disabled = self.disabled_for >= self.min_disabled_ticks;

        if !output.config.write && output.config.addr == self.params.cable_config_address {
            let cable = CableProperties { capability: self.cable, device_present: self.cable_present };
            input.config_data = cable.encode(&self.params);
        }

        if let Some(remaining) = self.fetch_due {
            if remaining == 0 {
                self.fetch_due = None;
                input.trans = self.complete_fetch();
            } else {
                self.fetch_due = Some(remaining - 1);
            }
        }
        if output.trans_select == TransKind::Fetch {
            self.fetch_due = Some(self.fetch_latency);
        }

        if output.training {
            input.os_sent = true;
            if self.echo_ordered_sets {
                input.os_received = output.os_select.to_bits();
            }
        }

        input
    }
}

/// A lane wired to its far end.
#[derive(Debug, Clone)]
pub struct Bench {
    pub lane: Lane,
    pub far_end: FarEnd,
}

impl Bench {
    pub fn new(lane: Lane, far_end: FarEnd) -> Self { Self { lane, far_end } }

    /// Bench with default parameters and the given cable and partner generations.
    pub fn with_generations(cable: Generation, partner: Generation) -> Self {
        let params = LaneParams::default();
        Self::new(Lane::default(), FarEnd::new(cable, partner, params))
    }

    /// Advances one tick with the far end's inputs.
    pub fn step(&mut self) -> LaneTrace { self.step_with(|_| ()) }

    /// Advances one tick, letting `f` override the far end's inputs.
    pub fn step_with(&mut self, f: impl FnOnce(&mut LaneInput)) -> LaneTrace {
        let mut input = self.far_end.drive(&self.lane.output());
        f(&mut input);
        self.lane.tick(&input);
        self.lane.trace(input)
    }

    /// Steps until the lane is in `phase`. Returns the number of ticks taken.
    pub fn run_until(&mut self, phase: LinkPhase, max_ticks: u64) -> Result<u64, LaneError> {
        for ticks in 0..=max_ticks {
            if self.lane.phase() == Some(phase) {
                info!(?phase, ticks, cycle = self.lane.cycle(), "phase reached");
                return Ok(ticks);
            }
            if ticks < max_ticks {
                self.step();
            }
        }
        Err(LaneError::NotReached { phase, ticks: max_ticks })
    }
}
