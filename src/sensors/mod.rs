//! Sensor subsystem: I2C drivers, the aggregating [`SensorHub`], and the
//! processing stages that turn raw samples into control events.
//!
//! | Module        | Role                                           |
//! |---------------|------------------------------------------------|
//! | `climate`     | BME280 temperature / humidity driver           |
//! | `distance`    | VL53L0X time-of-flight driver                  |
//! | `gesture`     | TAP / HOLD_STEP recognition from distances     |
//! | `environment` | Rate-of-change auto activation                 |
//!
//! Both chips share one I2C bus owned by the hub; the drivers borrow it per
//! call.

pub mod climate;
pub mod distance;
pub mod environment;
pub mod gesture;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::error::SensorError;
use climate::Bme280;
use distance::Vl53l0x;

/// One temperature / humidity sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

impl ClimateReading {
    pub fn is_finite(&self) -> bool {
        self.temperature_c.is_finite() && self.humidity_pct.is_finite()
    }
}

/// Owns the I2C bus, a delay source, and both sensor drivers.
///
/// Read failures are logged and degraded: climate keeps the last good
/// sample (or reports nothing until the first one), distance reports
/// "no data".
pub struct SensorHub<I2C, D> {
    bus: I2C,
    delay: D,
    climate: Bme280,
    distance: Vl53l0x,
    last_climate: Option<ClimateReading>,
    climate_failures: u32,
}

impl<I2C: I2c, D: DelayNs> SensorHub<I2C, D> {
    /// Probe and configure both chips.
    pub fn new(mut bus: I2C, mut delay: D, bme_addr: u8, tof_addr: u8) -> Result<Self, SensorError> {
        let climate = Bme280::init(&mut bus, &mut delay, bme_addr)?;
        let distance = Vl53l0x::init(&mut bus, tof_addr)?;
        info!("SensorHub: BME280 @0x{:02x}, VL53L0X @0x{:02x} ready", bme_addr, tof_addr);
        Ok(Self {
            bus,
            delay,
            climate,
            distance,
            last_climate: None,
            climate_failures: 0,
        })
    }

    /// Latest climate sample; `None` until one read has succeeded.
    pub fn read_climate(&mut self) -> Option<ClimateReading> {
        match self.climate.read(&mut self.bus) {
            Ok(r) => {
                self.last_climate = Some(r);
                Some(r)
            }
            Err(e) => {
                self.climate_failures = self.climate_failures.saturating_add(1);
                warn!("BME280 read failed: {} ({} total)", e, self.climate_failures);
                self.last_climate
            }
        }
    }

    pub fn read_distance(&mut self) -> Option<u16> {
        match self.distance.read_single_mm(&mut self.bus, &mut self.delay) {
            Ok(mm) => mm,
            Err(e) => {
                log::debug!("VL53L0X read failed: {}", e);
                None
            }
        }
    }

    pub fn climate_failures(&self) -> u32 {
        self.climate_failures
    }
}
