//! Fan controller settings.
//!
//! All tunable parameters for the HoodFan system.  Loaded once at boot via
//! [`ConfigPort`](crate::app::ports::ConfigPort) and owned by the
//! application service thereafter; runtime changes are written back with a
//! debounce.

use serde::{Deserialize, Serialize};

use crate::control::speed::Speed;
use crate::error::ValidationError;

/// Maximum stored webhook URL length (bytes).
pub const WEBHOOK_URL_CAP: usize = 128;

/// Bounded webhook URL.
pub type WebhookUrl = heapless::String<WEBHOOK_URL_CAP>;

/// Rate-of-change auto activation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoSettings {
    /// Whether a temperature/humidity rise may switch the fan on.
    pub enabled: bool,
    /// Temperature rise that triggers activation (°C per minute).
    pub temp_rise_threshold: f32,
    /// Humidity rise that triggers activation (% RH per minute).
    pub hum_rise_threshold: f32,
    /// Minimum spacing between evaluated samples (milliseconds).
    pub monitoring_interval_ms: u32,
}

impl Default for AutoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            temp_rise_threshold: 2.0,
            hum_rise_threshold: 5.0,
            monitoring_interval_ms: 60_000,
        }
    }
}

impl AutoSettings {
    pub const THRESHOLD_MAX: f32 = 100.0;
    pub const INTERVAL_MIN_MS: u32 = 1_000;
    pub const INTERVAL_MAX_MS: u32 = 3_600_000;

    /// Range-check every field.  Thresholds must be positive and finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let ok = |t: f32| t.is_finite() && t > 0.0 && t <= Self::THRESHOLD_MAX;
        if !ok(self.temp_rise_threshold) {
            return Err(ValidationError::TempThreshold(self.temp_rise_threshold));
        }
        if !ok(self.hum_rise_threshold) {
            return Err(ValidationError::HumThreshold(self.hum_rise_threshold));
        }
        if !(Self::INTERVAL_MIN_MS..=Self::INTERVAL_MAX_MS).contains(&self.monitoring_interval_ms) {
            return Err(ValidationError::MonitoringInterval(self.monitoring_interval_ms));
        }
        Ok(())
    }
}

/// Persisted controller settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanConfig {
    /// Speed a TAP or auto activation switches to.
    pub default_speed: Speed,
    /// Whether the contactless gesture sensor is polled.
    pub gesture_enabled: bool,
    /// Rate-of-change monitor parameters.
    pub auto: AutoSettings,
    /// Webhook endpoint; empty disables webhook delivery.
    pub webhook_url: WebhookUrl,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            default_speed: Speed::LOW,
            gesture_enabled: true,
            auto: AutoSettings::default(),
            webhook_url: WebhookUrl::new(),
        }
    }
}

/// Validate a candidate webhook URL and copy it into bounded storage.
///
/// An empty string is accepted and disables webhook delivery.
pub fn parse_webhook_url(url: &str) -> Result<WebhookUrl, ValidationError> {
    let url = url.trim();
    if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ValidationError::WebhookUrl);
    }
    let mut out = WebhookUrl::new();
    out.push_str(url).map_err(|()| ValidationError::WebhookUrl)?;
    Ok(out)
}

/// Range-check a full settings record before it is persisted.
pub fn validate_config(cfg: &FanConfig) -> Result<(), ValidationError> {
    cfg.auto.validate()?;
    parse_webhook_url(&cfg.webhook_url)?;
    Ok(())
}
