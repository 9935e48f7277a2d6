//! ST VL53L0X time-of-flight ranging sensor over I2C.
//!
//! Minimal single-shot driver: default tuning, no SPAD recalibration.
//! Accurate enough for the 50–200 mm gesture window.
//!
//! A measurement returns `Ok(None)` when the chip reports anything other
//! than a valid range (no target, signal fail, phase fail, …).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use crate::error::SensorError;

pub const DEFAULT_ADDRESS: u8 = 0x29;

const REG_SYSRANGE_START: u8 = 0x00;
const REG_SYSTEM_SEQUENCE_CONFIG: u8 = 0x01;
const REG_SYSTEM_INTERRUPT_CONFIG_GPIO: u8 = 0x0A;
const REG_SYSTEM_INTERRUPT_CLEAR: u8 = 0x0B;
const REG_RESULT_INTERRUPT_STATUS: u8 = 0x13;
const REG_RESULT_RANGE_STATUS: u8 = 0x14;
const REG_MSRC_CONFIG_CONTROL: u8 = 0x60;
const REG_GPIO_HV_MUX_ACTIVE_HIGH: u8 = 0x84;
const REG_I2C_MODE: u8 = 0x88;
const REG_VHV_CONFIG_PAD_SCL_SDA_EXTSUP_HV: u8 = 0x89;
const REG_STOP_VARIABLE: u8 = 0x91;
const REG_IDENTIFICATION_MODEL_ID: u8 = 0xC0;
const REG_POWER_MANAGEMENT: u8 = 0x80;
const REG_PAGE_SELECT: u8 = 0xFF;

const MODEL_ID: u8 = 0xEE;
/// Device range status code for a valid measurement.
const RANGE_STATUS_VALID: u8 = 11;
/// Distances at or above this are the chip's "out of range" sentinel.
const RANGE_SENTINEL_MM: u16 = 8190;
/// ~100 ms at 1 ms per poll; a single-shot takes ~33 ms.
const MAX_POLLS: u32 = 100;

/// Decode the 12-byte result block at `RESULT_RANGE_STATUS`.
///
/// Returns `None` unless the device status is "range valid" and the
/// distance is below the sentinel.
pub fn decode_result(block: &[u8; 12]) -> Option<u16> {
    let status = (block[0] & 0x78) >> 3;
    let mm = u16::from_be_bytes([block[10], block[11]]);
    (status == RANGE_STATUS_VALID && mm < RANGE_SENTINEL_MM).then_some(mm)
}

pub struct Vl53l0x {
    address: u8,
    stop_variable: u8,
}

impl Vl53l0x {
    /// Verify the model id and apply the basic data init.
    pub fn init<I2C: I2c>(i2c: &mut I2C, address: u8) -> Result<Self, SensorError> {
        let id = read_reg(i2c, address, REG_IDENTIFICATION_MODEL_ID)?;
        if id != MODEL_ID {
            return Err(SensorError::WrongChip(id));
        }

        // 2V8 I/O mode, standard I2C.
        let pad = read_reg(i2c, address, REG_VHV_CONFIG_PAD_SCL_SDA_EXTSUP_HV)?;
        write_reg(i2c, address, REG_VHV_CONFIG_PAD_SCL_SDA_EXTSUP_HV, pad | 0x01)?;
        write_reg(i2c, address, REG_I2C_MODE, 0x00)?;

        let stop_variable = with_private_page(i2c, address, |i2c| read_reg(i2c, address, REG_STOP_VARIABLE))?;

        // Disable SIGNAL_RATE_MSRC / PRE_RANGE limit checks.
        let msrc = read_reg(i2c, address, REG_MSRC_CONFIG_CONTROL)?;
        write_reg(i2c, address, REG_MSRC_CONFIG_CONTROL, msrc | 0x12)?;
        write_reg(i2c, address, REG_SYSTEM_SEQUENCE_CONFIG, 0xE8)?;

        // Interrupt on new sample ready, active low.
        write_reg(i2c, address, REG_SYSTEM_INTERRUPT_CONFIG_GPIO, 0x04)?;
        let mux = read_reg(i2c, address, REG_GPIO_HV_MUX_ACTIVE_HIGH)?;
        write_reg(i2c, address, REG_GPIO_HV_MUX_ACTIVE_HIGH, mux & !0x10)?;
        write_reg(i2c, address, REG_SYSTEM_INTERRUPT_CLEAR, 0x01)?;

        debug!("VL53L0X init done (stop_variable=0x{:02x})", stop_variable);
        Ok(Self { address, stop_variable })
    }

    /// Trigger one measurement and block until it completes.
    pub fn read_single_mm<I2C: I2c>(&self, i2c: &mut I2C, delay: &mut impl DelayNs) -> Result<Option<u16>, SensorError> {
        let addr = self.address;
        let stop = self.stop_variable;
        with_private_page(i2c, addr, |i2c| write_reg(i2c, addr, REG_STOP_VARIABLE, stop))?;
        write_reg(i2c, addr, REG_SYSRANGE_START, 0x01)?;

        let mut polls = 0;
        while read_reg(i2c, addr, REG_RESULT_INTERRUPT_STATUS)? & 0x07 == 0 {
            polls += 1;
            if polls >= MAX_POLLS {
                return Err(SensorError::Timeout);
            }
            delay.delay_ms(1);
        }

        let mut block = [0u8; 12];
        i2c.write_read(addr, &[REG_RESULT_RANGE_STATUS], &mut block)
            .map_err(|_| SensorError::Bus)?;
        write_reg(i2c, addr, REG_SYSTEM_INTERRUPT_CLEAR, 0x01)?;

        Ok(decode_result(&block))
    }
}

/// Run `f` with the vendor private register page selected.
fn with_private_page<I2C: I2c, T>(
    i2c: &mut I2C,
    address: u8,
    f: impl FnOnce(&mut I2C) -> Result<T, SensorError>,
) -> Result<T, SensorError> {
    write_reg(i2c, address, REG_POWER_MANAGEMENT, 0x01)?;
    write_reg(i2c, address, REG_PAGE_SELECT, 0x01)?;
    write_reg(i2c, address, REG_SYSRANGE_START, 0x00)?;
    let out = f(i2c);
    write_reg(i2c, address, REG_SYSRANGE_START, 0x01)?;
    write_reg(i2c, address, REG_PAGE_SELECT, 0x00)?;
    write_reg(i2c, address, REG_POWER_MANAGEMENT, 0x00)?;
    out
}

fn read_reg<I2C: I2c>(i2c: &mut I2C, address: u8, reg: u8) -> Result<u8, SensorError> {
    let mut buf = [0u8; 1];
    i2c.write_read(address, &[reg], &mut buf)
        .map_err(|_| SensorError::Bus)?;
    Ok(buf[0])
}

fn write_reg<I2C: I2c>(i2c: &mut I2C, address: u8, reg: u8, value: u8) -> Result<(), SensorError> {
    i2c.write(address, &[reg, value]).map_err(|_| SensorError::Bus)
}
