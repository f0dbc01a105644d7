//! Signal vocabulary of the lane control unit.

use linkflow::*;

use crate::constants::widths::*;

/// Phase of link bring-up.
///
/// The phase register is 4 bits wide; codes 14 and 15 are unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Signal)]
#[width(4)]
pub enum LinkPhase {
    #[default]
    Disabled,
    CablePropertyDiscovery,
    DeviceDetection,
    ParameterExchange,
    ClockSwitch,
    Gen4Ts1,
    Gen4Ts2,
    Gen4Ts3,
    Gen4Ts4,
    Gen3Slos1,
    Gen3Slos2,
    Gen3Ts1,
    Gen3Ts2,
    Active,
}

impl LinkPhase {
    /// Every phase, in encoding order.
    pub const ALL: [LinkPhase; 14] = [
        LinkPhase::Disabled,
        LinkPhase::CablePropertyDiscovery,
        LinkPhase::DeviceDetection,
        LinkPhase::ParameterExchange,
        LinkPhase::ClockSwitch,
        LinkPhase::Gen4Ts1,
        LinkPhase::Gen4Ts2,
        LinkPhase::Gen4Ts3,
        LinkPhase::Gen4Ts4,
        LinkPhase::Gen3Slos1,
        LinkPhase::Gen3Slos2,
        LinkPhase::Gen3Ts1,
        LinkPhase::Gen3Ts2,
        LinkPhase::Active,
    ];

    /// Decodes the phase register. `None` for unused codes.
    pub fn from_code(code: Bits<PHASE_WIDTH>) -> Option<Self> { Self::decode(code.value()) }

    /// Encodes the phase register.
    pub fn code(self) -> Bits<PHASE_WIDTH> { self.to_bits() }

    pub fn is_gen4_training(self) -> bool {
        matches!(self, LinkPhase::Gen4Ts1 | LinkPhase::Gen4Ts2 | LinkPhase::Gen4Ts3 | LinkPhase::Gen4Ts4)
    }

    pub fn is_gen3_training(self) -> bool {
        matches!(self, LinkPhase::Gen3Slos1 | LinkPhase::Gen3Slos2 | LinkPhase::Gen3Ts1 | LinkPhase::Gen3Ts2)
    }

    pub fn is_training(self) -> bool { self.is_gen4_training() || self.is_gen3_training() }

    /// Phases in which a partner is attached, i.e. from device detection onward.
    ///
    /// A disconnect request returns every attached phase to `DeviceDetection`.
    pub fn is_attached(self) -> bool { !matches!(self, LinkPhase::Disabled | LinkPhase::CablePropertyDiscovery) }

    /// Ordered set transmitted in this phase.
    pub fn os_select(self) -> OsSelector {
        match self {
            LinkPhase::Gen4Ts1 => OsSelector::Gen4Ts1,
            LinkPhase::Gen4Ts2 => OsSelector::Gen4Ts2,
            LinkPhase::Gen4Ts3 => OsSelector::Gen4Ts3,
            LinkPhase::Gen4Ts4 => OsSelector::Gen4Ts4,
            LinkPhase::Gen3Slos1 => OsSelector::Gen3Slos1,
            LinkPhase::Gen3Slos2 => OsSelector::Gen3Slos2,
            LinkPhase::Gen3Ts1 => OsSelector::Gen3Ts1,
            LinkPhase::Gen3Ts2 => OsSelector::Gen3Ts2,
            LinkPhase::Active => OsSelector::Data,
            LinkPhase::Disabled
            | LinkPhase::CablePropertyDiscovery
            | LinkPhase::DeviceDetection
            | LinkPhase::ParameterExchange
            | LinkPhase::ClockSwitch => OsSelector::Idle,
        }
    }
}

/// Ordered-set selector driven to the physical layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Signal)]
#[width(4)]
pub enum OsSelector {
    #[encode(0)]
    Gen3Slos1,
    #[encode(1)]
    Gen3Slos2,
    #[encode(2)]
    Gen3Ts1,
    #[encode(3)]
    Gen3Ts2,
    #[encode(4)]
    Gen4Ts1,
    #[encode(5)]
    Gen4Ts2,
    #[encode(6)]
    Gen4Ts3,
    #[encode(7)]
    Gen4Ts4,
    /// Pass-through data.
    #[encode(8)]
    Data,
    /// Zeros.
    #[default]
    #[encode(9)]
    Idle,
}

/// Link generation, ordered by data rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Signal)]
#[width(2)]
pub enum Generation {
    #[default]
    #[encode(0)]
    Gen2,
    #[encode(1)]
    Gen3,
    #[encode(2)]
    Gen4,
}

/// Transaction selected on the shared channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Signal)]
#[width(2)]
pub enum TransKind {
    #[default]
    #[encode(0)]
    Idle,
    /// Fetch of the partner's adapter parameters.
    #[encode(1)]
    Fetch,
    #[encode(2)]
    Write,
    #[encode(3)]
    Read,
}

/// Transaction bus from the transaction layer.
///
/// The same strobes carry both externally issued requests (with read or write intent) and
/// completions (without intent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Signal)]
pub struct Transaction {
    pub valid: bool,
    pub read: bool,
    pub write: bool,
    pub error: bool,
    pub addr: Bits<ADDR_WIDTH>,
    pub data: Bits<DATA_WIDTH>,
}

impl Transaction {
    /// A completion carrying neither read nor write intent and no error.
    ///
    /// Only the fetch-parameters transaction completes this way on this channel.
    pub fn is_fetch_response(&self) -> bool { self.valid && !self.read && !self.write && !self.error }

    pub fn is_error(&self) -> bool { self.valid && self.error }
}

/// Timeout pulses raised by external timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Signal)]
pub struct Timeouts {
    /// The minimum time in `Disabled` has elapsed.
    pub min_disabled: bool,
    pub training_error: bool,
    pub gen4_ts1: bool,
    pub gen4_ts2: bool,
}

/// Inputs of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Signal)]
pub struct LaneInput {
    /// Global reset. Overrides everything computed in the tick.
    pub reset: bool,
    pub disable: bool,
    /// Disconnect request from the partner.
    pub disconnect: bool,
    /// Ordered-set code received from the partner, in `OsSelector` encoding. `Idle` while the
    /// partner sends nothing.
    #[member(name = "os_rx")]
    pub os_received: Bits<OS_CODE_WIDTH>,
    /// One ordered set was sent this tick.
    pub os_sent: bool,
    #[member(name = "trans")]
    pub trans: Transaction,
    /// Config-space read data.
    #[member(name = "cfg_rdata")]
    pub config_data: Bits<CONFIG_DATA_WIDTH>,
    /// The channel synchronizer cannot accept a new selection.
    pub busy: bool,
    #[member(name = "timeout")]
    pub timeouts: Timeouts,
}

impl Default for LaneInput {
    fn default() -> Self {
        Self {
            reset: false,
            disable: false,
            disconnect: false,
            os_received: OsSelector::Idle.to_bits(),
            os_sent: false,
            trans: Transaction::default(),
            config_data: Bits::ZERO,
            busy: false,
            timeouts: Timeouts::default(),
        }
    }
}

/// Config-space request port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Signal)]
pub struct ConfigPort {
    pub wdata: Bits<CONFIG_DATA_WIDTH>,
    pub addr: Bits<ADDR_WIDTH>,
    /// `true` for write, `false` for read.
    pub write: bool,
}

impl ConfigPort {
    pub fn read(addr: Bits<ADDR_WIDTH>) -> Self { Self { wdata: Bits::ZERO, addr, write: false } }
}

/// Pass-through request toward the transaction layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Signal)]
pub struct PassThrough {
    pub addr: Bits<ADDR_WIDTH>,
    pub data: Bits<DATA_WIDTH>,
    pub read: bool,
    pub write: bool,
}

/// Registered outputs of the lane, assembled from the controller and the arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Signal)]
pub struct LaneOutput {
    pub trans_select: TransKind,
    pub disconnect: bool,
    pub disabled: bool,
    pub training: bool,
    pub sending_ts1: bool,
    pub sending_ts2: bool,
    #[member(name = "os_sel")]
    pub os_select: OsSelector,
    #[member(name = "gen")]
    pub generation: Generation,
    #[member(name = "cfg")]
    pub config: ConfigPort,
    #[member(name = "tl")]
    pub passthrough: PassThrough,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_codes_are_dense_with_two_unused() {
        for (code, phase) in LinkPhase::ALL.iter().enumerate() {
            assert_eq!(phase.code().value(), code as u64);
            assert_eq!(LinkPhase::from_code(phase.code()), Some(*phase));
        }
        assert_eq!(LinkPhase::from_code(Bits::truncate(14)), None);
        assert_eq!(LinkPhase::from_code(Bits::truncate(15)), None);
    }

    #[test]
    fn selector_encoding_matches_phy_vocabulary() {
        assert_eq!(OsSelector::Idle.encode(), 9);
        assert_eq!(OsSelector::Data.encode(), 8);
        let gen4 = [LinkPhase::Gen4Ts1, LinkPhase::Gen4Ts2, LinkPhase::Gen4Ts3, LinkPhase::Gen4Ts4];
        let gen3 = [LinkPhase::Gen3Slos1, LinkPhase::Gen3Slos2, LinkPhase::Gen3Ts1, LinkPhase::Gen3Ts2];
        for (i, phase) in gen4.iter().enumerate() {
            assert_eq!(phase.os_select().encode(), 4 + i as u64);
        }
        for (i, phase) in gen3.iter().enumerate() {
            assert_eq!(phase.os_select().encode(), i as u64);
        }
        assert_eq!(OsSelector::decode(10), None);
        assert!(OsSelector::try_decode(12).is_err());
    }

    #[test]
    fn enum_transl_is_lsb_first() {
        assert_eq!(OsSelector::Idle.transl(), vec![true, false, false, true]);
        assert_eq!(TransKind::Read.transl(), vec![true, true]);
        assert_eq!(Generation::Gen4.transl(), vec![false, true]);
    }

    #[test]
    fn port_widths_match_interface() {
        let inputs = LaneInput::port_decls().ports();
        let width_of = |ports: &[(String, usize)], name: &str| {
            ports.iter().find(|(n, _)| n == name).map(|(_, w)| *w).unwrap_or_else(|| panic!("no port {name}"))
        };
        assert_eq!(width_of(&inputs, "os_rx"), 4);
        assert_eq!(width_of(&inputs, "trans_addr"), 8);
        assert_eq!(width_of(&inputs, "trans_data"), 24);
        assert_eq!(width_of(&inputs, "cfg_rdata"), 32);
        assert_eq!(width_of(&inputs, "timeout_gen4_ts2"), 1);
        assert_eq!(LaneInput::WIDTH, LaneInput::port_decls().width());

        let outputs = LaneOutput::port_decls().ports();
        assert_eq!(width_of(&outputs, "trans_select"), 2);
        assert_eq!(width_of(&outputs, "os_sel"), 4);
        assert_eq!(width_of(&outputs, "gen"), 2);
        assert_eq!(width_of(&outputs, "cfg_wdata"), 32);
        assert_eq!(width_of(&outputs, "cfg_addr"), 8);
        assert_eq!(width_of(&outputs, "cfg_write"), 1);
        assert_eq!(width_of(&outputs, "tl_addr"), 8);
        assert_eq!(width_of(&outputs, "tl_data"), 24);
        assert_eq!(LaneOutput::WIDTH, 2 + 5 + 4 + 2 + 41 + 34);
        assert_eq!(LinkPhase::WIDTH, PHASE_WIDTH);
        assert_eq!(OsSelector::WIDTH, OS_CODE_WIDTH);
        assert_eq!(Generation::WIDTH, GENERATION_WIDTH);
        assert_eq!(TransKind::WIDTH, TRANS_KIND_WIDTH);
    }

    #[test]
    fn idle_input_receives_no_ordered_set() {
        let input = LaneInput::default();
        assert_eq!(OsSelector::try_decode(input.os_received.value()), Ok(OsSelector::Idle));
        assert!(LinkPhase::ALL.iter().all(|phase| !phase.is_training() || phase.os_select() != OsSelector::Idle));
    }

    #[test]
    fn fetch_response_has_no_intent() {
        let response = Transaction { valid: true, ..Default::default() };
        assert!(response.is_fetch_response());
        assert!(!Transaction { write: true, ..response }.is_fetch_response());
        assert!(!Transaction { read: true, ..response }.is_fetch_response());
        assert!(!Transaction { error: true, ..response }.is_fetch_response());
        assert!(!Transaction::default().is_fetch_response());
    }
}
