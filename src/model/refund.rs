//! Periodic ammo refund: the shared rule and the discrete magazine exhaustion counter.
//! The trajectory simulator applies the same `RefundRule` shot by shot.

use crate::config::{REFUND_AMOUNT, REFUND_INTERVAL};

/// Refund of `amount` ammo on every `interval`-th cumulative shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundRule {
    pub interval: u64,
    pub amount: u32,
}

impl Default for RefundRule {
    fn default() -> Self {
        Self {
            interval: REFUND_INTERVAL,
            amount: REFUND_AMOUNT,
        }
    }
}

impl RefundRule {
    /// Ammo refunded by the shot with 1-based cumulative index `shot_number`.
    pub fn refund_for_shot(&self, shot_number: u64) -> u32 {
        if shot_number > 0 && shot_number % self.interval == 0 {
            self.amount
        } else {
            0
        }
    }

    /// Refund count over the shots `from+1 ..= to` (cumulative numbering).
    pub fn refunds_between(&self, from: u64, to: u64) -> u64 {
        if to <= from {
            return 0;
        }
        to / self.interval - from / self.interval
    }
}

/// Trigger-pulls needed to empty one magazine of `capacity`.
///
/// Without the refund this is the capacity itself. With it, every 10th pull
/// gives 4 back to the consumed count; pulls stop once consumed reaches capacity.
pub fn shots_to_exhaust(capacity: u32, refund: bool) -> u64 {
    if !refund {
        return capacity as u64;
    }
    let rule = RefundRule::default();
    let capacity = capacity as i64;
    let mut pulls: u64 = 0;
    let mut consumed: i64 = 0;
    while consumed < capacity {
        pulls += 1;
        consumed += 1;
        consumed -= rule.refund_for_shot(pulls) as i64;
    }
    pulls
}
