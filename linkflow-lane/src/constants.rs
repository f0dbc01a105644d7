//! Constants for lane modules.

use linkflow::clog2;
use static_assertions::const_assert;

// Widths of the signal vocabulary.
pub mod widths {
    pub const PHASE_WIDTH: usize = 4;
    pub const OS_CODE_WIDTH: usize = 4;
    pub const GENERATION_WIDTH: usize = 2;
    pub const TRANS_KIND_WIDTH: usize = 2;
    pub const ADDR_WIDTH: usize = 8;
    pub const DATA_WIDTH: usize = 24;
    pub const CONFIG_DATA_WIDTH: usize = 32;
}

// Constants for `ordered_set`.
pub mod ordered_set {
    use super::*;

    /// Ordered sets sent per Gen4 training step.
    pub const GEN4_THRESHOLD: u64 = 16;
    /// Ordered sets sent per Gen3 training step.
    pub const GEN3_THRESHOLD: u64 = 32;
    pub const COUNT_WIDTH: usize = clog2(GEN3_THRESHOLD as usize + 1);
}

// Constants for `config_reader`.
pub mod config_reader {
    /// Config-space address of the cable property word.
    pub const CABLE_CONFIG_ADDRESS: u64 = 0x0C;
    /// Identity byte reported by an attached cable.
    pub const CABLE_ID_SENTINEL: u64 = 0x5A;
    pub const CABLE_ID_LSB: usize = 24;
    pub const CABLE_GEN4_BIT: usize = 17;
    pub const CABLE_GEN3_BIT: usize = 16;
}

// Constants for `negotiation`.
pub mod negotiation {
    pub const PARTNER_GEN4_BIT: usize = 9;
    pub const PARTNER_GEN3_BIT: usize = 8;
}

const_assert!(ordered_set::GEN4_THRESHOLD > 0);
const_assert!(ordered_set::GEN3_THRESHOLD < 1 << ordered_set::COUNT_WIDTH);
const_assert!(ordered_set::GEN4_THRESHOLD < 1 << ordered_set::COUNT_WIDTH);
const_assert!(config_reader::CABLE_CONFIG_ADDRESS < 1 << widths::ADDR_WIDTH);
const_assert!(config_reader::CABLE_ID_SENTINEL < 1 << 8);
const_assert!(config_reader::CABLE_ID_LSB + 8 <= widths::CONFIG_DATA_WIDTH);
const_assert!(config_reader::CABLE_GEN4_BIT < widths::CONFIG_DATA_WIDTH);
const_assert!(config_reader::CABLE_GEN3_BIT < widths::CONFIG_DATA_WIDTH);
const_assert!(negotiation::PARTNER_GEN4_BIT < widths::DATA_WIDTH);
const_assert!(negotiation::PARTNER_GEN3_BIT < widths::DATA_WIDTH);
