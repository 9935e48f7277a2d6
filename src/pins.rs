//! GPIO / peripheral assignments for the HoodFan controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Motor tap relays (active-low relay board)
// ---------------------------------------------------------------------------

/// Relay channel 1 (L1).
pub const RELAY_1_GPIO: i32 = 5;
/// Relay channel 2 (L2).
pub const RELAY_2_GPIO: i32 = 32;
/// Relay channel 3 (L3).
pub const RELAY_3_GPIO: i32 = 33;

// ---------------------------------------------------------------------------
// I²C bus (BME280 + VL53L0X)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;
/// Standard mode; the VL53L0X is configured for 100 kHz.
pub const I2C_BAUDRATE_HZ: u32 = 100_000;

/// BME280 with SDO tied low.
pub const BME280_ADDR: u8 = crate::sensors::climate::DEFAULT_ADDRESS;
/// VL53L0X factory address.
pub const VL53L0X_ADDR: u8 = crate::sensors::distance::DEFAULT_ADDRESS;
