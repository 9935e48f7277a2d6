//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the [`RelayBank`], exposing them through
//! [`SensorPort`] and [`ActuatorPort`].  This is the only module in the
//! system that touches actual hardware.  Generic over the `embedded-hal`
//! traits so the same adapter runs on ESP-IDF drivers and on host doubles.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::control::relay::RelayPattern;
use crate::drivers::relays::RelayBank;
use crate::error::{Error, Result};
use crate::sensors::{ClimateReading, SensorHub};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I2C, D, P> {
    sensors: SensorHub<I2C, D>,
    relays: RelayBank<P>,
}

impl<I2C: I2c, D: DelayNs, P: OutputPin> HardwareAdapter<I2C, D, P> {
    /// Release the relays first, then bring up the sensors.
    pub fn new(i2c: I2C, delay: D, relay_pins: [P; 3], bme_addr: u8, tof_addr: u8) -> Result<Self> {
        let relays = RelayBank::new(relay_pins);
        let sensors = SensorHub::new(i2c, delay, bme_addr, tof_addr).map_err(Error::from)?;
        Ok(Self { sensors, relays })
    }

    pub fn applied_pattern(&self) -> RelayPattern {
        self.relays.applied()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I2C: I2c, D: DelayNs, P: OutputPin> SensorPort for HardwareAdapter<I2C, D, P> {
    fn read_climate(&mut self) -> Option<ClimateReading> {
        self.sensors.read_climate()
    }

    fn read_distance(&mut self) -> Option<u16> {
        self.sensors.read_distance()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I2C: I2c, D: DelayNs, P: OutputPin> ActuatorPort for HardwareAdapter<I2C, D, P> {
    fn set_relay_pattern(&mut self, pattern: RelayPattern) {
        self.relays.apply(pattern);
    }
}
