//! Config-space read of the cable property word during cable property discovery.
//!
//! The read is a fixed two-tick pipeline: the address is issued on the first tick in the phase and
//! the data input is valid on the following tick.

use linkflow::*;

use crate::constants::widths::CONFIG_DATA_WIDTH;
use crate::params::LaneParams;
use crate::types::Generation;

/// Progress of the read pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Signal)]
pub struct ConfigRead {
    pub address_sent: bool,
    pub data_received: bool,
}

/// Properties decoded from the cable property word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CableProperties {
    pub capability: Generation,
    pub device_present: bool,
}

impl CableProperties {
    pub fn decode(word: Bits<CONFIG_DATA_WIDTH>, params: &LaneParams) -> Self {
        Self {
            capability: params.cable_caps.decode(word),
            device_present: word.clip::<8>(params.cable_id_lsb) == params.cable_id_sentinel,
        }
    }

    /// Config word reporting these properties, the inverse of `decode`.
    pub fn encode(&self, params: &LaneParams) -> Bits<CONFIG_DATA_WIDTH> {
        let id = if self.device_present { params.cable_id_sentinel.value() << params.cable_id_lsb } else { 0 };
        Bits::truncate(id | params.cable_caps.encode::<CONFIG_DATA_WIDTH>(self.capability).value())
    }
}

impl ConfigRead {
    /// Advances the pipeline by one tick spent in discovery.
    ///
    /// Returns the properties on the tick the data input is valid. A finished read restarts, so a
    /// cable that failed the identity check is polled again.
    pub fn next(self, data: Bits<CONFIG_DATA_WIDTH>, params: &LaneParams) -> (Self, Option<CableProperties>) {
        match (self.address_sent, self.data_received) {
            (false, _) => (Self { address_sent: true, data_received: false }, None),
            (true, false) => {
                (Self { address_sent: true, data_received: true }, Some(CableProperties::decode(data, params)))
            }
            (true, true) => (Self::default(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_is_sampled_on_second_tick() {
        let params = LaneParams::default();
        let cable = CableProperties { capability: Generation::Gen4, device_present: true };
        let word = cable.encode(&params);

        let (read, props) = ConfigRead::default().next(word, &params);
        assert_eq!(read, ConfigRead { address_sent: true, data_received: false });
        assert_eq!(props, None);

        let (read, props) = read.next(word, &params);
        assert_eq!(read, ConfigRead { address_sent: true, data_received: true });
        assert_eq!(props, Some(cable));

        let (read, props) = read.next(word, &params);
        assert_eq!(read, ConfigRead::default());
        assert_eq!(props, None);
    }

    #[test]
    fn identity_must_match_sentinel() {
        let params = LaneParams::default();
        let word = Bits::truncate(0x5B << params.cable_id_lsb | 1 << params.cable_caps.gen3);
        let props = CableProperties::decode(word, &params);
        assert!(!props.device_present);
        assert_eq!(props.capability, Generation::Gen3);
        assert_eq!(CableProperties::decode(Bits::ZERO, &params).capability, Generation::Gen2);
    }
}
