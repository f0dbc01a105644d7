//! Link-state controller.
//!
//! Owns the phase register, the capability latches, the ordered-set tracker and the config read
//! pipeline. Every output is registered: it is computed from the phase before the clock edge and
//! becomes visible after it.

use linkflow::*;

use crate::config_reader::ConfigRead;
use crate::constants::widths::PHASE_WIDTH;
use crate::negotiation::negotiate;
use crate::ordered_set::OsTracker;
use crate::params::LaneParams;
use crate::types::{ConfigPort, Generation, LaneInput, LinkPhase, OsSelector};

/// Registered outputs of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Signal)]
pub struct ControllerOutput {
    pub disabled: bool,
    pub training: bool,
    pub sending_ts1: bool,
    pub sending_ts2: bool,
    pub os_select: OsSelector,
    pub generation: Generation,
    pub config: ConfigPort,
}

impl ControllerOutput {
    /// Outputs driven while `phase` is current. An unused phase code drives everything idle.
    fn new(phase: Option<LinkPhase>, generation: Generation, params: &LaneParams) -> Self {
        Self {
            disabled: phase == Some(LinkPhase::Disabled),
            training: phase.map_or(false, LinkPhase::is_training),
            sending_ts1: phase == Some(LinkPhase::Gen4Ts1),
            sending_ts2: phase == Some(LinkPhase::Gen4Ts2),
            os_select: phase.map_or(OsSelector::Idle, LinkPhase::os_select),
            generation,
            config: match phase {
                Some(LinkPhase::CablePropertyDiscovery) => ConfigPort::read(params.cable_config_address),
                _ => ConfigPort::default(),
            },
        }
    }
}

/// Controller registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    /// Raw phase register.
    pub phase: Bits<PHASE_WIDTH>,
    pub tracker: OsTracker,
    pub config_read: ConfigRead,
    pub device_present: bool,
    pub cable: Generation,
    pub partner: Generation,
    /// Negotiated generation.
    pub generation: Generation,
    pub output: ControllerOutput,
}

impl ControllerState {
    pub fn phase(&self) -> Option<LinkPhase> { LinkPhase::from_code(self.phase) }
}

/// Computes the phase of the next tick.
///
/// Disable outranks everything, then a disconnect request from any attached phase. Within a
/// training step a fallback timeout outranks advancing. An unused phase code goes to `Disabled`.
pub fn next_phase(input: &LaneInput, state: &ControllerState) -> LinkPhase {
    use LinkPhase::*;

    let phase = match state.phase() {
        Some(phase) => phase,
        None => return Disabled,
    };
    let timeouts = &input.timeouts;
    let done = state.tracker.done();

    if input.disable {
        return Disabled;
    }
    if input.disconnect && phase.is_attached() {
        return DeviceDetection;
    }

    match phase {
        Disabled => select! {
            timeouts.min_disabled => CablePropertyDiscovery,
            default => Disabled,
        },
        CablePropertyDiscovery => select! {
            state.device_present => DeviceDetection,
            default => CablePropertyDiscovery,
        },
        DeviceDetection => ParameterExchange,
        ParameterExchange => select! {
            input.trans.is_fetch_response() => ClockSwitch,
            default => ParameterExchange,
        },
        ClockSwitch => select! {
            state.generation == Generation::Gen4 => Gen4Ts1,
            default => Gen3Slos1,
        },
        Gen4Ts1 => select! {
            timeouts.gen4_ts1 || timeouts.training_error => ParameterExchange,
            done => Gen4Ts2,
            default => Gen4Ts1,
        },
        Gen4Ts2 => select! {
            timeouts.gen4_ts2 || timeouts.training_error => ParameterExchange,
            done => Gen4Ts3,
            default => Gen4Ts2,
        },
        Gen4Ts3 => select! {
            timeouts.training_error => ParameterExchange,
            done => Gen4Ts4,
            default => Gen4Ts3,
        },
        Gen4Ts4 => select! {
            timeouts.training_error => ParameterExchange,
            done => Active,
            default => Gen4Ts4,
        },
        Gen3Slos1 => select! {
            timeouts.training_error => ParameterExchange,
            done => Gen3Slos2,
            default => Gen3Slos1,
        },
        Gen3Slos2 => select! {
            timeouts.training_error => ParameterExchange,
            done => Gen3Ts1,
            default => Gen3Slos2,
        },
        Gen3Ts1 => select! {
            timeouts.training_error => ParameterExchange,
            done => Gen3Ts2,
            default => Gen3Ts1,
        },
        Gen3Ts2 => select! {
            timeouts.training_error => ParameterExchange,
            done => Active,
            default => Gen3Ts2,
        },
        Active => Active,
    }
}

/// Link-state controller.
#[derive(Debug, Clone)]
pub struct Controller {
    params: LaneParams,
}

impl Controller {
    pub fn new(params: LaneParams) -> Self { Self { params } }

    pub fn params(&self) -> &LaneParams { &self.params }
}

impl Fsm for Controller {
    type Input = LaneInput;
    type Output = ControllerOutput;
    type State = ControllerState;

    fn module_name(&self) -> &str { "link_state_controller" }

    fn init(&self) -> ControllerState {
        ControllerState {
            phase: LinkPhase::Disabled.code(),
            tracker: OsTracker::default(),
            config_read: ConfigRead::default(),
            device_present: false,
            cable: Generation::Gen2,
            partner: Generation::Gen2,
            generation: Generation::Gen2,
            output: ControllerOutput::new(Some(LinkPhase::Disabled), Generation::Gen2, &self.params),
        }
    }

    fn step(&self, input: &LaneInput, state: &ControllerState) -> (ControllerOutput, ControllerState) {
        let params = &self.params;
        let phase = state.phase();
        let next = next_phase(input, state);
        let stay = phase == Some(next);

        let tracker = match phase {
            Some(phase) => state.tracker.next(phase, next, input.os_sent, input.os_received, params),
            None => OsTracker::default(),
        };

        let (config_read, cable_props) = match phase {
            Some(LinkPhase::CablePropertyDiscovery) if stay => state.config_read.next(input.config_data, params),
            _ => (ConfigRead::default(), None),
        };
        let (cable, device_present) = match (cable_props, phase) {
            (Some(props), _) => (props.capability, props.device_present),
            (None, Some(LinkPhase::Disabled)) => (state.cable, false),
            (None, _) => (state.cable, state.device_present),
        };

        let (partner, generation) = match phase {
            Some(LinkPhase::ParameterExchange) => {
                let partner = params.partner_caps.decode(input.trans.data);
                (partner, negotiate(state.cable, partner))
            }
            _ => (state.partner, state.generation),
        };

        let output = ControllerOutput::new(phase, state.generation, params);
        let state_next = ControllerState {
            phase: next.code(),
            tracker,
            config_read,
            device_present,
            cable,
            partner,
            generation,
            output,
        };

        (output, state_next)
    }
}
