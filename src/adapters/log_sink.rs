//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production, stderr on host).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                default_speed,
                gesture_enabled,
            } => {
                info!("START | default_speed={} | gesture={}", default_speed, gesture_enabled);
            }
            AppEvent::SpeedChanged { from, to, cause } => {
                info!("FAN | {} -> {} | cause={}", from, to, cause);
            }
            AppEvent::RiseDetected {
                temp_per_min,
                hum_per_min,
            } => {
                info!("RISE | temp={:+.2}C/min | hum={:+.2}%/min", temp_per_min, hum_per_min);
            }
            AppEvent::AutoSettingsChanged(a) => {
                info!(
                    "AUTO | enabled={} | temp>={:.1}C/min | hum>={:.1}%/min | interval={}ms",
                    a.enabled, a.temp_rise_threshold, a.hum_rise_threshold, a.monitoring_interval_ms
                );
            }
            AppEvent::GestureControl(enabled) => {
                info!("GESTURE | enabled={}", enabled);
            }
            AppEvent::SettingsSaved => {
                info!("CONFIG | saved");
            }
        }
    }
}
