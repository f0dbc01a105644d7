//! Top-level lane: the controller and the arbiter on one clock.

use linkflow::*;
use tracing::{debug, trace};

use crate::arbiter::{Arbiter, ArbiterInput, ArbiterOutput, ArbiterState, PendingFetch};
use crate::constants::widths::PHASE_WIDTH;
use crate::controller::{Controller, ControllerOutput, ControllerState};
use crate::ordered_set::OsTracker;
use crate::params::LaneParams;
use crate::types::{LaneInput, LaneOutput, LinkPhase};
use crate::LaneError;

fn assemble(controller: &ControllerOutput, arbiter: &ArbiterOutput) -> LaneOutput {
    LaneOutput {
        trans_select: arbiter.trans_select,
        disconnect: arbiter.disconnect,
        disabled: controller.disabled,
        training: controller.training,
        sending_ts1: controller.sending_ts1,
        sending_ts2: controller.sending_ts2,
        os_select: controller.os_select,
        generation: controller.generation,
        config: controller.config,
        passthrough: arbiter.passthrough,
    }
}

/// Snapshot of a lane after a tick, for waveform dumps.
#[derive(Debug, Clone, Signal)]
pub struct LaneTrace {
    #[member(name = "in")]
    pub input: LaneInput,
    #[member(name = "out")]
    pub output: LaneOutput,
    pub phase: Bits<PHASE_WIDTH>,
    #[member(name = "os")]
    pub tracker: OsTracker,
    #[member(name = "fetch")]
    pub fetch: PendingFetch,
}

/// Lane control unit.
#[derive(Debug, Clone)]
pub struct Lane {
    controller: Reg<Controller>,
    arbiter: Reg<Arbiter>,
}

impl Default for Lane {
    fn default() -> Self { Self::build(LaneParams::default()) }
}

impl Lane {
    /// Creates a lane in its reset state.
    pub fn new(params: LaneParams) -> Result<Self, LaneError> {
        params.validate()?;
        Ok(Self::build(params))
    }

    fn build(params: LaneParams) -> Self {
        Self { controller: Reg::new(Controller::new(params)), arbiter: Reg::new(Arbiter) }
    }

    pub fn params(&self) -> &LaneParams { self.controller.module().params() }

    /// Current phase. `None` if the phase register holds an unused code.
    pub fn phase(&self) -> Option<LinkPhase> { self.controller.state().phase() }

    /// Number of ticks since creation, resets included.
    pub fn cycle(&self) -> u64 { self.controller.cycle() }

    pub fn controller(&self) -> &ControllerState { self.controller.state() }

    pub fn arbiter(&self) -> &ArbiterState { self.arbiter.state() }

    /// Registered outputs.
    pub fn output(&self) -> LaneOutput { assemble(&self.controller.state().output, &self.arbiter.state().output) }

    /// Advances one tick and returns the outputs registered at its clock edge.
    ///
    /// Both processes are evaluated on the state before the edge; the arbiter sees the phase the
    /// controller is in, never the one it is moving to. Reset discards the evaluation.
    pub fn tick(&mut self, input: &LaneInput) -> LaneOutput {
        let phase = self.phase();

        if input.reset {
            self.controller.reset();
            self.arbiter.reset();
            debug!(cycle = self.cycle(), from = ?phase, "reset");
            return self.output();
        }

        let (_, controller_next) = self.controller.eval(input);
        let (_, arbiter_next) =
            self.arbiter.eval(&ArbiterInput { phase: phase.unwrap_or(LinkPhase::Disabled), lane: *input });
        self.controller.commit(controller_next);
        self.arbiter.commit(arbiter_next);

        let next = self.phase();
        if next != phase {
            debug!(cycle = self.cycle(), from = ?phase, to = ?next, "phase change");
        }

        let output = self.output();
        trace!(cycle = self.cycle(), phase = ?next, trans = ?output.trans_select, os = ?output.os_select, "tick");
        output
    }

    /// Overwrites the phase register without advancing time.
    pub fn force_phase_code(&mut self, code: Bits<PHASE_WIDTH>) {
        debug!(cycle = self.cycle(), ?code, "phase register forced");
        self.controller.force(|state| state.phase = code);
    }

    /// Snapshot of the lane paired with the input of the last tick.
    pub fn trace(&self, input: LaneInput) -> LaneTrace {
        let controller = self.controller.state();
        LaneTrace {
            input,
            output: self.output(),
            phase: controller.phase,
            tracker: controller.tracker,
            fetch: self.arbiter.state().fetch,
        }
    }
}
