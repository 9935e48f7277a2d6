//! Outbound application events and wire payloads.
//!
//! [`AppEvent`]s go through the [`EventSink`](super::ports::EventSink)
//! port (serial log).  [`StateSnapshot`] and [`WebhookPayload`] are the
//! JSON documents pushed to UI clients and the webhook endpoint.

use serde::Serialize;

use crate::config::AutoSettings;
use crate::control::speed::Speed;
use crate::event_log::Cause;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started (carries the boot settings).
    Started { default_speed: Speed, gesture_enabled: bool },

    /// The fan changed speed.
    SpeedChanged { from: Speed, to: Speed, cause: Cause },

    /// A climate rise was seen while the fan was already running.
    RiseDetected { temp_per_min: f32, hum_per_min: f32 },

    /// Auto activation parameters changed.
    AutoSettingsChanged(AutoSettings),

    /// Gesture control toggled.
    GestureControl(bool),

    /// Settings written to persistent storage.
    SettingsSaved,
}

/// Full state pushed to UI clients after every change and sensor refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub current_speed: Speed,
    pub temperature: f32,
    pub humidity: f32,
    pub gesture_control_enabled: bool,
    pub gesture_detected: bool,
    pub hold_detected: bool,
    pub temp_rise_threshold: f32,
    pub hum_rise_threshold: f32,
    /// Milliseconds.
    pub monitoring_interval: u32,
    pub auto_activation_enabled: bool,
    /// Millimetres, `-1` when the sensor has no data.
    pub distance: i32,
}

/// Body of the webhook POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub speed: Speed,
    pub cause: Cause,
    pub previous_speed: Speed,
    pub temperature: f32,
    pub humidity: f32,
    pub running_time_seconds: u64,
}
