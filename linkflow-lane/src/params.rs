//! Lane parameters.

use linkflow::Bits;

use crate::constants::config_reader::*;
use crate::constants::negotiation::*;
use crate::constants::ordered_set::*;
use crate::constants::widths::*;
use crate::negotiation::CapabilityBits;
use crate::LaneError;

/// Parameters of a lane control unit. `Default` gives the values in [`crate::constants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneParams {
    /// Ordered sets sent per Gen4 training step.
    pub gen4_threshold: u64,
    /// Ordered sets sent per Gen3 training step.
    pub gen3_threshold: u64,
    /// Config-space address read during cable property discovery.
    pub cable_config_address: Bits<ADDR_WIDTH>,
    /// Identity byte of an attached cable.
    pub cable_id_sentinel: Bits<8>,
    /// Bit position of the identity byte in the config word.
    pub cable_id_lsb: usize,
    /// Capability bits in the config word.
    pub cable_caps: CapabilityBits,
    /// Capability bits in the partner's parameter payload.
    pub partner_caps: CapabilityBits,
}

impl Default for LaneParams {
    fn default() -> Self {
        Self {
            gen4_threshold: GEN4_THRESHOLD,
            gen3_threshold: GEN3_THRESHOLD,
            cable_config_address: Bits::truncate(CABLE_CONFIG_ADDRESS),
            cable_id_sentinel: Bits::truncate(CABLE_ID_SENTINEL),
            cable_id_lsb: CABLE_ID_LSB,
            cable_caps: CapabilityBits { gen4: CABLE_GEN4_BIT, gen3: CABLE_GEN3_BIT },
            partner_caps: CapabilityBits { gen4: PARTNER_GEN4_BIT, gen3: PARTNER_GEN3_BIT },
        }
    }
}

impl LaneParams {
    /// Checks that thresholds fit the ordered-set counter and bit positions fit their words.
    pub fn validate(&self) -> Result<(), LaneError> {
        let max_count = (1 << COUNT_WIDTH) - 1;
        for threshold in [self.gen4_threshold, self.gen3_threshold] {
            if threshold == 0 || threshold > max_count {
                return Err(LaneError::Threshold { threshold, width: COUNT_WIDTH });
            }
        }

        let bits = [
            ("cable id", self.cable_id_lsb + 7, CONFIG_DATA_WIDTH),
            ("cable gen4", self.cable_caps.gen4, CONFIG_DATA_WIDTH),
            ("cable gen3", self.cable_caps.gen3, CONFIG_DATA_WIDTH),
            ("partner gen4", self.partner_caps.gen4, DATA_WIDTH),
            ("partner gen3", self.partner_caps.gen3, DATA_WIDTH),
        ];
        for (field, bit, width) in bits {
            if bit >= width {
                return Err(LaneError::BitPosition { field, bit, width });
            }
        }
        Ok(())
    }

    /// Sets the config-space address and identity byte of the cable from raw values.
    pub fn with_cable(mut self, address: u64, sentinel: u64) -> Result<Self, LaneError> {
        self.cable_config_address = Bits::new(address)?;
        self.cable_id_sentinel = Bits::new(sentinel)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() { assert!(LaneParams::default().validate().is_ok()); }

    #[test]
    fn rejects_threshold_beyond_counter() {
        let params = LaneParams { gen3_threshold: 64, ..LaneParams::default() };
        assert!(matches!(params.validate(), Err(LaneError::Threshold { threshold: 64, .. })));
        let params = LaneParams { gen4_threshold: 0, ..LaneParams::default() };
        assert!(matches!(params.validate(), Err(LaneError::Threshold { threshold: 0, .. })));
    }

    #[test]
    fn rejects_bit_outside_word() {
        let params = LaneParams { cable_id_lsb: 25, ..LaneParams::default() };
        assert!(matches!(params.validate(), Err(LaneError::BitPosition { field: "cable id", bit: 32, width: 32 })));
        let params = LaneParams { partner_caps: CapabilityBits { gen4: 24, gen3: 8 }, ..LaneParams::default() };
        assert!(matches!(params.validate(), Err(LaneError::BitPosition { field: "partner gen4", .. })));
    }

    #[test]
    fn raw_cable_values_must_fit() {
        let params = LaneParams::default().with_cable(0x10, 0xa5).unwrap();
        assert_eq!(params.cable_config_address.value(), 0x10);
        assert_eq!(params.cable_id_sentinel.value(), 0xa5);
        assert!(matches!(
            LaneParams::default().with_cable(0x100, 0x5a),
            Err(LaneError::Signal(linkflow::SignalError::Overflow { value: 0x100, width: 8 }))
        ));
    }
}
