//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (HTTP handlers,
//! UI websocket, serial console) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.
//! Producers in other tasks enqueue them on
//! [`COMMAND_CHANNEL`](crate::channels::COMMAND_CHANNEL).

use crate::config::{AutoSettings, WebhookUrl, parse_webhook_url};
use crate::control::speed::Speed;
use crate::error::ValidationError;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Manual speed change (cause API).
    SetSpeed(Speed),

    /// Speed used by TAP and auto activation.
    SetDefaultSpeed(Speed),

    /// Replace the auto activation parameters.
    SetAutoSettings(AutoSettings),

    /// Enable or disable the gesture sensor.
    SetGestureEnabled(bool),

    /// Replace the webhook URL (empty disables webhooks).
    SetWebhookUrl(WebhookUrl),

    /// Drop every event log entry.
    ClearLogs,

    /// Persist the settings immediately instead of after the debounce.
    SaveSettings,
}

impl AppCommand {
    /// Build a [`SetSpeed`](Self::SetSpeed) from a raw request value.
    /// Out-of-range values are rejected here, before reaching the queue.
    pub fn set_speed(raw: i32) -> Result<Self, ValidationError> {
        Speed::try_from(raw).map(Self::SetSpeed)
    }

    pub fn set_default_speed(raw: i32) -> Result<Self, ValidationError> {
        Speed::try_from(raw).map(Self::SetDefaultSpeed)
    }

    pub fn set_auto_settings(
        enabled: bool,
        temp_rise_threshold: f32,
        hum_rise_threshold: f32,
        monitoring_interval_ms: u32,
    ) -> Result<Self, ValidationError> {
        let settings = AutoSettings {
            enabled,
            temp_rise_threshold,
            hum_rise_threshold,
            monitoring_interval_ms,
        };
        settings.validate()?;
        Ok(Self::SetAutoSettings(settings))
    }

    pub fn set_webhook_url(url: &str) -> Result<Self, ValidationError> {
        parse_webhook_url(url).map(Self::SetWebhookUrl)
    }
}
