//! Transaction arbiter.
//!
//! Multiplexes the internally generated fetch-parameters transaction and externally issued
//! read/write requests onto the shared transaction channel. Apart from the pending-fetch flags it
//! is a priority multiplexer re-evaluated every tick from the controller's current phase.

use linkflow::*;
use tracing::trace;

use crate::constants::widths::{ADDR_WIDTH, DATA_WIDTH};
use crate::types::{LaneInput, LinkPhase, PassThrough, TransKind};

/// Pending fetch-parameters request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Signal)]
pub struct PendingFetch {
    /// Set every tick in `ParameterExchange`.
    pub send_requested: bool,
    /// Set once the fetch code was selected; cleared when an errored transaction re-arms the fetch.
    pub send_completed: bool,
}

/// Registered outputs of the arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Signal)]
pub struct ArbiterOutput {
    pub trans_select: TransKind,
    pub disconnect: bool,
    #[member(name = "tl")]
    pub passthrough: PassThrough,
}

impl ArbiterOutput {
    fn detached() -> Self { Self { disconnect: true, ..Self::default() } }

    fn idle() -> Self { Self::default() }

    fn fetch() -> Self { Self { trans_select: TransKind::Fetch, ..Self::default() } }

    fn write(addr: Bits<ADDR_WIDTH>, data: Bits<DATA_WIDTH>) -> Self {
        Self {
            trans_select: TransKind::Write,
            disconnect: false,
            passthrough: PassThrough { addr, data, read: false, write: true },
        }
    }

    fn read(addr: Bits<ADDR_WIDTH>) -> Self {
        Self {
            trans_select: TransKind::Read,
            disconnect: false,
            passthrough: PassThrough { addr, data: Bits::ZERO, read: true, write: false },
        }
    }
}

/// Arbiter registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArbiterState {
    pub fetch: PendingFetch,
    pub output: ArbiterOutput,
}

/// Input of the arbiter: the lane inputs and the controller's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbiterInput {
    pub phase: LinkPhase,
    pub lane: LaneInput,
}

/// Transaction arbiter.
#[derive(Debug, Clone, Default)]
pub struct Arbiter;

impl Fsm for Arbiter {
    type Input = ArbiterInput;
    type Output = ArbiterOutput;
    type State = ArbiterState;

    fn module_name(&self) -> &str { "transaction_arbiter" }

    fn init(&self) -> ArbiterState { ArbiterState { fetch: PendingFetch::default(), output: ArbiterOutput::detached() } }

    fn step(&self, input: &ArbiterInput, state: &ArbiterState) -> (ArbiterOutput, ArbiterState) {
        let lane = &input.lane;
        let trans = &lane.trans;
        let exchange = input.phase == LinkPhase::ParameterExchange;
        let rearm = exchange && trans.is_error();
        let fetch_wanted = exchange && ((state.fetch.send_requested && !state.fetch.send_completed) || rearm);

        let output = select! {
            !input.phase.is_attached() => ArbiterOutput::detached(),
            fetch_wanted => select! {
                lane.busy => {
                    trace!(phase = ?input.phase, "fetch stalled: channel busy");
                    ArbiterOutput::idle()
                },
                default => ArbiterOutput::fetch(),
            },
            trans.valid && trans.write => ArbiterOutput::write(trans.addr, trans.data),
            trans.valid && trans.read => select! {
                lane.busy => {
                    trace!(addr = ?trans.addr, "read stalled: channel busy");
                    ArbiterOutput::idle()
                },
                default => ArbiterOutput::read(trans.addr),
            },
            default => ArbiterOutput::idle(),
        };

        let fetch_selected = output.trans_select == TransKind::Fetch;
        let fetch = PendingFetch {
            send_requested: exchange,
            send_completed: exchange && (fetch_selected || (state.fetch.send_completed && !rearm)),
        };

        (output, ArbiterState { fetch, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transaction;

    fn arbiter(fetch: PendingFetch) -> Reg<Arbiter> {
        let mut reg = Reg::new(Arbiter);
        reg.force(|state| state.fetch = fetch);
        reg
    }

    fn input(phase: LinkPhase, trans: Transaction, busy: bool) -> ArbiterInput {
        ArbiterInput { phase, lane: LaneInput { trans, busy, ..Default::default() } }
    }

    const WRITE: Transaction = Transaction {
        valid: true,
        read: false,
        write: true,
        error: false,
        addr: Bits::truncate(0x21),
        data: Bits::truncate(0xabcdef),
    };

    const READ: Transaction = Transaction { read: true, write: false, ..WRITE };

    #[test]
    fn detached_phases_force_idle_and_disconnect() {
        for phase in [LinkPhase::Disabled, LinkPhase::CablePropertyDiscovery] {
            let mut reg = arbiter(PendingFetch { send_requested: true, send_completed: false });
            let out = reg.tick(&input(phase, WRITE, false));
            assert_eq!(out, ArbiterOutput { disconnect: true, ..Default::default() });
            assert_eq!(reg.state().fetch, PendingFetch::default());
        }
    }

    #[test]
    fn fetch_is_issued_once_per_exchange() {
        let phase = LinkPhase::ParameterExchange;
        let mut reg = Reg::new(Arbiter);
        let idle = input(phase, Transaction::default(), false);

        assert_eq!(reg.tick(&idle).trans_select, TransKind::Idle);
        assert_eq!(reg.state().fetch, PendingFetch { send_requested: true, send_completed: false });

        assert_eq!(reg.tick(&idle).trans_select, TransKind::Fetch);
        assert_eq!(reg.state().fetch, PendingFetch { send_requested: true, send_completed: true });

        for _ in 0..4 {
            assert_eq!(reg.tick(&idle).trans_select, TransKind::Idle);
        }
    }

    #[test]
    fn busy_channel_delays_fetch() {
        let phase = LinkPhase::ParameterExchange;
        let mut reg = arbiter(PendingFetch { send_requested: true, send_completed: false });
        for _ in 0..3 {
            let out = reg.tick(&input(phase, Transaction::default(), true));
            assert_eq!(out.trans_select, TransKind::Idle);
            assert!(!reg.state().fetch.send_completed);
        }
        assert_eq!(reg.tick(&input(phase, Transaction::default(), false)).trans_select, TransKind::Fetch);
    }

    #[test]
    fn pending_fetch_outranks_external_requests() {
        let phase = LinkPhase::ParameterExchange;
        let mut reg = arbiter(PendingFetch { send_requested: true, send_completed: false });
        let out = reg.tick(&input(phase, WRITE, true));
        assert_eq!(out.trans_select, TransKind::Idle);
        assert!(!out.passthrough.write);
    }

    #[test]
    fn error_rearms_fetch() {
        let phase = LinkPhase::ParameterExchange;
        let failed = Transaction { valid: true, error: true, ..Default::default() };

        let mut reg = arbiter(PendingFetch { send_requested: true, send_completed: true });
        let out = reg.tick(&input(phase, failed, true));
        assert_eq!(out.trans_select, TransKind::Idle);
        assert_eq!(reg.state().fetch, PendingFetch { send_requested: true, send_completed: false });
        assert_eq!(reg.tick(&input(phase, Transaction::default(), false)).trans_select, TransKind::Fetch);

        let mut reg = arbiter(PendingFetch { send_requested: true, send_completed: true });
        assert_eq!(reg.tick(&input(phase, failed, false)).trans_select, TransKind::Fetch);
        assert!(reg.state().fetch.send_requested);
    }

    #[test]
    fn stalled_fetch_is_dropped_after_exchange() {
        let mut reg = arbiter(PendingFetch { send_requested: true, send_completed: false });
        let out = reg.tick(&input(LinkPhase::ClockSwitch, Transaction::default(), false));
        assert_eq!(out, ArbiterOutput::idle());
        assert_eq!(reg.state().fetch, PendingFetch::default());
    }

    #[test]
    fn write_ignores_busy() {
        let mut reg = Reg::new(Arbiter);
        let out = reg.tick(&input(LinkPhase::Active, WRITE, true));
        assert_eq!(out.trans_select, TransKind::Write);
        assert!(!out.disconnect);
        assert_eq!(out.passthrough, PassThrough { addr: WRITE.addr, data: WRITE.data, read: false, write: true });
    }

    #[test]
    fn read_waits_for_channel() {
        let mut reg = Reg::new(Arbiter);
        let out = reg.tick(&input(LinkPhase::Active, READ, true));
        assert_eq!(out, ArbiterOutput::default());
        let out = reg.tick(&input(LinkPhase::Active, READ, false));
        assert_eq!(out.trans_select, TransKind::Read);
        assert!(out.passthrough.read && !out.passthrough.write);
        assert_eq!(out.passthrough.addr, READ.addr);
    }

    #[test]
    fn write_wins_over_read_intent() {
        let both = Transaction { read: true, ..WRITE };
        let mut reg = Reg::new(Arbiter);
        assert_eq!(reg.tick(&input(LinkPhase::Active, both, false)).trans_select, TransKind::Write);
    }
}
