//! Generation negotiation.

use linkflow::*;

use crate::types::Generation;

/// Bit positions of the two capability flags in a parameter word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityBits {
    pub gen4: usize,
    pub gen3: usize,
}

impl CapabilityBits {
    /// Decodes the advertised generation. Gen4 is checked before Gen3; neither means Gen2.
    pub fn decode<const N: usize>(&self, word: Bits<N>) -> Generation {
        select! {
            word.bit(self.gen4) => Generation::Gen4,
            word.bit(self.gen3) => Generation::Gen3,
            default => Generation::Gen2,
        }
    }

    /// Word advertising `generation`, the inverse of `decode`.
    pub fn encode<const N: usize>(&self, generation: Generation) -> Bits<N> {
        match generation {
            Generation::Gen4 => Bits::truncate(1 << self.gen4),
            Generation::Gen3 => Bits::truncate(1 << self.gen3),
            Generation::Gen2 => Bits::ZERO,
        }
    }
}

/// Negotiated generation: the slower of the two sides.
pub fn negotiate(cable: Generation, partner: Generation) -> Generation { cable.min(partner) }
