//! Speed → relay pattern encoding.
//!
//! The hood motor has three taps switched by an active-low relay board.
//! Each speed stage maps to exactly one output combination:
//!
//! | Speed | L1 | L2 | L3 |
//! |-------|----|----|----|
//! | 0     | 1  | 1  | 1  |
//! | 1     | 1  | 1  | 0  |
//! | 2     | 1  | 0  | 1  |
//! | 3     | 1  | 0  | 0  |
//! | 4     | 0  | 1  | 0  |
//!
//! `1` = output HIGH = relay released, `0` = output LOW = relay energised.

use super::speed::Speed;
use crate::error::ValidationError;

/// Output levels for the three relay channels (`true` = HIGH = inactive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayPattern {
    pub levels: [bool; 3],
}

impl RelayPattern {
    /// Every relay released: the safe boot state.
    pub const ALL_OFF: Self = Self {
        levels: [true, true, true],
    };

    /// Whether relay `channel` (0-based) is energised.
    pub fn is_energised(&self, channel: usize) -> bool {
        !self.levels[channel]
    }
}

const TABLE: [[bool; 3]; Speed::COUNT] = [
    [true, true, true],
    [true, true, false],
    [true, false, true],
    [true, false, false],
    [false, true, false],
];

/// Encode a validated speed.  Total: `Speed` cannot hold an invalid value.
pub const fn encode(speed: Speed) -> RelayPattern {
    RelayPattern {
        levels: TABLE[speed.get() as usize],
    }
}

/// Encode a raw speed value, rejecting anything outside 0..=4.
///
/// Never clamps.
pub fn encode_raw(speed: i32) -> Result<RelayPattern, ValidationError> {
    Speed::try_from(speed).map(encode)
}
