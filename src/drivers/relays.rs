//! Three-channel relay bank switching the hood motor taps.
//!
//! Takes a [`RelayPattern`] and drives each output pin to the requested
//! level.  All three pins are written on every change, in channel order.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::control::relay::RelayPattern;

pub struct RelayBank<P> {
    pins: [P; 3],
    applied: RelayPattern,
}

impl<P: OutputPin> RelayBank<P> {
    /// Take ownership of the pins and release every relay.
    pub fn new(pins: [P; 3]) -> Self {
        let mut bank = Self {
            pins,
            applied: RelayPattern::ALL_OFF,
        };
        bank.apply(RelayPattern::ALL_OFF);
        bank
    }

    /// Write all three levels.  A failing pin is logged and skipped; the
    /// remaining channels are still written.
    pub fn apply(&mut self, pattern: RelayPattern) {
        for (ch, (pin, &high)) in self.pins.iter_mut().zip(pattern.levels.iter()).enumerate() {
            if pin.set_state(PinState::from(high)).is_err() {
                warn!("Relay L{}: GPIO write failed", ch + 1);
            }
        }
        self.applied = pattern;
    }

    /// Last pattern written.
    pub fn applied(&self) -> RelayPattern {
        self.applied
    }
}
