//! Ordered-set handshake tracker.
//!
//! A training step is complete once enough ordered sets were sent and the partner's ordered set of
//! the same step was seen at least once.

use linkflow::*;

use crate::constants::ordered_set::COUNT_WIDTH;
use crate::constants::widths::OS_CODE_WIDTH;
use crate::params::LaneParams;
use crate::types::{LinkPhase, OsSelector};

/// Expected ordered set and number of ordered sets to send in a training step.
pub fn handshake(phase: LinkPhase, params: &LaneParams) -> Option<(OsSelector, u64)> {
    if phase.is_gen4_training() {
        Some((phase.os_select(), params.gen4_threshold))
    } else if phase.is_gen3_training() {
        Some((phase.os_select(), params.gen3_threshold))
    } else {
        None
    }
}

/// Tracker registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Signal)]
pub struct OsTracker {
    pub sent_count: Bits<COUNT_WIDTH>,
    pub enough_sent: bool,
    pub received: bool,
}

impl OsTracker {
    pub fn done(&self) -> bool { self.enough_sent && self.received }

    /// Next value while the controller stays in `phase`.
    ///
    /// The counter saturates at the step's threshold. Outside training steps the tracker holds zero.
    pub fn accumulate(self, phase: LinkPhase, os_sent: bool, os_received: Bits<OS_CODE_WIDTH>, params: &LaneParams) -> Self {
        let (expected, threshold) = match handshake(phase, params) {
            Some(handshake) => handshake,
            None => return Self::default(),
        };

        let count = self.sent_count.value();
        let count = if os_sent { (count + 1).min(threshold) } else { count };

        Self {
            sent_count: Bits::truncate(count),
            enough_sent: count >= threshold,
            received: self.received || os_received.value() == expected.encode(),
        }
    }

    /// Next value given the phase the controller computed for the next tick.
    pub fn next(
        self, phase: LinkPhase, next_phase: LinkPhase, os_sent: bool, os_received: Bits<OS_CODE_WIDTH>,
        params: &LaneParams,
    ) -> Self {
        if next_phase != phase {
            return Self::default();
        }
        self.accumulate(phase, os_sent, os_received, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(selector: OsSelector) -> Bits<OS_CODE_WIDTH> { selector.to_bits() }

    #[test]
    fn gen4_step_needs_sixteen_sets() {
        let params = LaneParams::default();
        let phase = LinkPhase::Gen4Ts1;
        let mut tracker = OsTracker::default();
        for i in 1..=15 {
            tracker = tracker.next(phase, phase, true, code(OsSelector::Gen4Ts1), &params);
            assert_eq!(tracker.sent_count.value(), i);
            assert!(!tracker.enough_sent);
            assert!(tracker.received);
        }
        tracker = tracker.next(phase, phase, true, Bits::ZERO, &params);
        assert!(tracker.enough_sent);
        assert!(tracker.done());

        tracker = tracker.next(phase, phase, true, Bits::ZERO, &params);
        assert_eq!(tracker.sent_count.value(), 16);
    }

    #[test]
    fn gen3_step_needs_thirty_two_sets() {
        let params = LaneParams::default();
        let phase = LinkPhase::Gen3Slos2;
        let mut tracker = OsTracker::default();
        for _ in 0..31 {
            tracker = tracker.next(phase, phase, true, Bits::ZERO, &params);
        }
        assert!(!tracker.enough_sent);
        tracker = tracker.next(phase, phase, true, Bits::ZERO, &params);
        assert!(tracker.enough_sent);
        assert!(!tracker.received);

        tracker = tracker.next(phase, phase, false, code(OsSelector::Gen3Slos2), &params);
        assert!(tracker.done());
    }

    #[test]
    fn received_requires_matching_code() {
        let params = LaneParams::default();
        let phase = LinkPhase::Gen4Ts2;
        let tracker = OsTracker::default().next(phase, phase, false, code(OsSelector::Gen4Ts1), &params);
        assert!(!tracker.received);
        let tracker = tracker.next(phase, phase, false, code(OsSelector::Gen4Ts2), &params);
        assert!(tracker.received);
        let tracker = tracker.next(phase, phase, false, code(OsSelector::Idle), &params);
        assert!(tracker.received);
    }

    #[test]
    fn resets_on_phase_change() {
        let params = LaneParams::default();
        let tracker = OsTracker { sent_count: Bits::truncate(12), enough_sent: false, received: true };
        let next = tracker.next(LinkPhase::Gen4Ts1, LinkPhase::ParameterExchange, true, Bits::ZERO, &params);
        assert_eq!(next, OsTracker::default());
    }

    #[test]
    fn holds_zero_outside_training() {
        let params = LaneParams::default();
        let phase = LinkPhase::Active;
        let tracker = OsTracker::default().next(phase, phase, true, code(OsSelector::Data), &params);
        assert_eq!(tracker, OsTracker::default());
    }
}
