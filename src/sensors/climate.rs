//! Bosch BME280 temperature / humidity sensor over I2C.
//!
//! Runs in normal mode (T×1, H×1, pressure skipped, 1 s standby) so each
//! read returns the latest completed conversion without blocking.
//! Compensation uses the datasheet's fixed-point integer formulas.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use super::ClimateReading;
use crate::error::SensorError;

pub const DEFAULT_ADDRESS: u8 = 0x76;

const REG_CALIB_00: u8 = 0x88;
const REG_CHIP_ID: u8 = 0xD0;
const REG_RESET: u8 = 0xE0;
const REG_CALIB_26: u8 = 0xE1;
const REG_CTRL_HUM: u8 = 0xF2;
const REG_STATUS: u8 = 0xF3;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_CONFIG: u8 = 0xF5;
const REG_DATA: u8 = 0xF7;

const CHIP_ID: u8 = 0x60;
const SOFT_RESET: u8 = 0xB6;
const STATUS_IM_UPDATE: u8 = 0x01;

/// Humidity oversampling ×1.
const CTRL_HUM: u8 = 0b001;
/// Temperature ×1, pressure skipped, normal mode.
const CTRL_MEAS: u8 = (0b001 << 5) | 0b11;
/// 1000 ms standby, filter off.
const CONFIG: u8 = 0b101 << 5;

/// Raw value the chip reports for a skipped/unfinished conversion.
const ADC_T_SKIPPED: i32 = 0x80000;
const ADC_H_SKIPPED: i32 = 0x8000;

/// Factory trimming parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calibration {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
    pub h1: u8,
    pub h2: i16,
    pub h3: u8,
    pub h4: i16,
    pub h5: i16,
    pub h6: i8,
}

impl Calibration {
    /// Decode from the 0x88..0xA1 (26 bytes) and 0xE1..0xE7 (7 bytes) blocks.
    pub fn from_registers(a: &[u8; 26], b: &[u8; 7]) -> Self {
        let u16le = |lo: u8, hi: u8| u16::from_le_bytes([lo, hi]);
        let i16le = |lo: u8, hi: u8| i16::from_le_bytes([lo, hi]);
        // H4/H5 are 12-bit signed values sharing the nibbles of 0xE5.
        let h4 = (i16::from(b[3] as i8) << 4) | i16::from(b[4] & 0x0F);
        let h5 = (i16::from(b[5] as i8) << 4) | i16::from(b[4] >> 4);
        Self {
            t1: u16le(a[0], a[1]),
            t2: i16le(a[2], a[3]),
            t3: i16le(a[4], a[5]),
            h1: a[25],
            h2: i16le(b[0], b[1]),
            h3: b[2],
            h4,
            h5,
            h6: b[6] as i8,
        }
    }

    /// Returns `(t_fine, temperature in 0.01 °C)`.
    pub fn compensate_temperature(&self, adc_t: i32) -> (i32, i32) {
        let t1 = i32::from(self.t1);
        let var1 = (((adc_t >> 3) - (t1 << 1)) * i32::from(self.t2)) >> 11;
        let d = (adc_t >> 4) - t1;
        let var2 = (((d * d) >> 12) * i32::from(self.t3)) >> 14;
        let t_fine = var1 + var2;
        (t_fine, (t_fine * 5 + 128) >> 8)
    }

    /// Relative humidity in Q22.10 %RH (divide by 1024).
    pub fn compensate_humidity(&self, adc_h: i32, t_fine: i32) -> u32 {
        let v = t_fine - 76_800;
        let a = (((adc_h << 14) - (i32::from(self.h4) << 20) - (i32::from(self.h5) * v)) + 16_384) >> 15;
        let b = ((((((v * i32::from(self.h6)) >> 10) * (((v * i32::from(self.h3)) >> 11) + 32_768)) >> 10)
            + 2_097_152)
            * i32::from(self.h2)
            + 8_192)
            >> 14;
        let mut v = a * b;
        v -= ((((v >> 15) * (v >> 15)) >> 7) * i32::from(self.h1)) >> 4;
        (v.clamp(0, 419_430_400) >> 12) as u32
    }
}

pub struct Bme280 {
    address: u8,
    calib: Calibration,
}

impl Bme280 {
    /// Verify the chip id, soft-reset, load calibration and start normal mode.
    pub fn init<I2C: I2c>(i2c: &mut I2C, delay: &mut impl DelayNs, address: u8) -> Result<Self, SensorError> {
        let id = read_reg(i2c, address, REG_CHIP_ID)?;
        if id != CHIP_ID {
            return Err(SensorError::WrongChip(id));
        }

        write_reg(i2c, address, REG_RESET, SOFT_RESET)?;
        delay.delay_ms(2);
        let mut tries = 0;
        while read_reg(i2c, address, REG_STATUS)? & STATUS_IM_UPDATE != 0 {
            tries += 1;
            if tries > 10 {
                return Err(SensorError::Timeout);
            }
            delay.delay_ms(1);
        }

        let mut a = [0u8; 26];
        let mut b = [0u8; 7];
        i2c.write_read(address, &[REG_CALIB_00], &mut a)
            .map_err(|_| SensorError::Bus)?;
        i2c.write_read(address, &[REG_CALIB_26], &mut b)
            .map_err(|_| SensorError::Bus)?;
        let calib = Calibration::from_registers(&a, &b);
        debug!("BME280 calibration: {:?}", calib);

        // ctrl_hum only latches after a ctrl_meas write.
        write_reg(i2c, address, REG_CTRL_HUM, CTRL_HUM)?;
        write_reg(i2c, address, REG_CONFIG, CONFIG)?;
        write_reg(i2c, address, REG_CTRL_MEAS, CTRL_MEAS)?;

        Ok(Self { address, calib })
    }

    /// Burst-read the latest conversion and compensate it.
    pub fn read<I2C: I2c>(&self, i2c: &mut I2C) -> Result<ClimateReading, SensorError> {
        let mut d = [0u8; 8];
        i2c.write_read(self.address, &[REG_DATA], &mut d)
            .map_err(|_| SensorError::Bus)?;

        let adc_t = (i32::from(d[3]) << 12) | (i32::from(d[4]) << 4) | (i32::from(d[5]) >> 4);
        let adc_h = (i32::from(d[6]) << 8) | i32::from(d[7]);
        if adc_t == ADC_T_SKIPPED || adc_h == ADC_H_SKIPPED {
            return Err(SensorError::OutOfRange);
        }

        let (t_fine, centi_c) = self.calib.compensate_temperature(adc_t);
        let q10_rh = self.calib.compensate_humidity(adc_h, t_fine);
        Ok(ClimateReading {
            temperature_c: centi_c as f32 / 100.0,
            humidity_pct: q10_rh as f32 / 1024.0,
        })
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calib
    }
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
