//! Rate-of-change monitor for kitchen climate.
//!
//! Cooking shows up as a fast rise in temperature or humidity.  Each
//! sensor refresh is fed to [`EnvironmentalMonitor::tick`]; once per
//! monitoring interval the monitor compares the reading with the last
//! evaluated one and converts the difference to a per-minute rate.
//!
//! - first reading: seeds the baseline, never triggers;
//! - rate ≥ threshold with the fan off: [`AutoEvent::AutoActivate`];
//! - rate ≥ threshold with the fan running: [`AutoEvent::Detect`] (log only).
//!
//! At most one event per evaluation.

use log::{debug, info};

use super::ClimateReading;
use crate::config::AutoSettings;
use crate::control::speed::Speed;

/// Per-minute rates computed from two evaluated samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiseRates {
    pub temp_per_min: f32,
    pub hum_per_min: f32,
}

/// Event handed to the speed controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoEvent {
    /// Threshold exceeded while the fan was off.
    AutoActivate(RiseRates),
    /// Threshold exceeded while the fan was already running.
    Detect(RiseRates),
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    reading: ClimateReading,
    at_ms: u64,
}

pub struct EnvironmentalMonitor {
    settings: AutoSettings,
    baseline: Option<Baseline>,
    latest: ClimateReading,
}

impl EnvironmentalMonitor {
    pub fn new(settings: AutoSettings) -> Self {
        Self {
            settings,
            baseline: None,
            latest: ClimateReading::default(),
        }
    }

    /// Process one sensor refresh.
    pub fn tick(&mut self, reading: ClimateReading, now_ms: u64, current: Speed) -> Option<AutoEvent> {
        if !reading.is_finite() {
            debug!("Monitor: ignoring non-finite reading {:?}", reading);
            return None;
        }
        self.latest = reading;

        let Some(base) = self.baseline else {
            self.baseline = Some(Baseline { reading, at_ms: now_ms });
            debug!(
                "Monitor: baseline seeded at {:.1}C / {:.1}%",
                reading.temperature_c, reading.humidity_pct
            );
            return None;
        };

        if !self.settings.enabled {
            return None;
        }
        let elapsed_ms = now_ms.saturating_sub(base.at_ms);
        if elapsed_ms == 0 || elapsed_ms < u64::from(self.settings.monitoring_interval_ms) {
            return None;
        }

        let minutes = elapsed_ms as f32 / 60_000.0;
        let rates = RiseRates {
            temp_per_min: (reading.temperature_c - base.reading.temperature_c) / minutes,
            hum_per_min: (reading.humidity_pct - base.reading.humidity_pct) / minutes,
        };
        self.baseline = Some(Baseline { reading, at_ms: now_ms });

        let triggered = rates.temp_per_min >= self.settings.temp_rise_threshold
            || rates.hum_per_min >= self.settings.hum_rise_threshold;
        if !triggered {
            return None;
        }

        info!(
            "Monitor: rise temp={:+.2}C/min hum={:+.2}%/min (speed {})",
            rates.temp_per_min, rates.hum_per_min, current
        );
        if current.is_off() {
            Some(AutoEvent::AutoActivate(rates))
        } else {
            Some(AutoEvent::Detect(rates))
        }
    }

    /// Replace the thresholds/interval/enable flag.  The baseline is kept.
    pub fn set_settings(&mut self, settings: AutoSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &AutoSettings {
        &self.settings
    }

    /// Most recent reading, evaluated or not.
    pub fn latest(&self) -> ClimateReading {
        self.latest
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }
}
