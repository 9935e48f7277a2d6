//! Fan speed ownership and arbitration.
//!
//! [`SpeedController`] is the only writer of the commanded speed.  Gesture
//! events, rate-rise events, API requests and the heartbeat all funnel
//! through it; every accepted change is recorded in the [`EventLog`],
//! written to the relays, and announced through the webhook and snapshot
//! ports.
//!
//! ```text
//!  GestureEvent ─┐
//!  AutoEvent ────┼─▶ SpeedController ─▶ ActuatorPort   (relay pattern)
//!  API request ──┘          │          ─▶ WebhookPort    (fire-and-forget)
//!                           ▼          ─▶ NotificationPort (snapshot)
//!                        EventLog
//! ```
//!
//! Outbound failures are counted and logged, never retried, and never undo
//! the transition that caused them.

use core::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::relay;
use crate::app::events::{StateSnapshot, WebhookPayload};
use crate::app::ports::{ActuatorPort, NotificationPort, WebhookPort};
use crate::config::{AutoSettings, WebhookUrl};
use crate::error::{NotificationError, ValidationError};
use crate::event_log::{Cause, EventLog, LogEntry};
use crate::sensors::ClimateReading;
use crate::sensors::environment::{AutoEvent, RiseRates};
use crate::sensors::gesture::{GestureEvent, PresenceReport};

// ───────────────────────────────────────────────────────────────
// Speed
// ───────────────────────────────────────────────────────────────

/// Fan speed stage, always within 0..=4 (0 = off).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Speed(u8);

impl Speed {
    pub const OFF: Self = Self(0);
    pub const LOW: Self = Self(1);
    pub const MAX: Self = Self(4);
    /// Number of distinct stages.
    pub const COUNT: usize = 5;

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn is_off(self) -> bool {
        self.0 == 0
    }

    /// Next stage, wrapping from 4 back to off.
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % Self::COUNT as u8)
    }

    /// Every stage in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }
}

impl TryFrom<i32> for Speed {
    type Error = ValidationError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        if (0..Self::COUNT as i32).contains(&raw) {
            Ok(Self(raw as u8))
        } else {
            Err(ValidationError::InvalidSpeed(raw))
        }
    }
}

impl TryFrom<u8> for Speed {
    type Error = ValidationError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::try_from(i32::from(raw))
    }
}

impl From<Speed> for u8 {
    fn from(s: Speed) -> Self {
        s.0
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Run timer
// ───────────────────────────────────────────────────────────────

/// Tracks how long the fan has been running.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTimer {
    started_at_ms: Option<u64>,
    last_run_ms: u64,
}

impl RunTimer {
    fn on_transition(&mut self, from: Speed, to: Speed, now_ms: u64) {
        match (from.is_off(), to.is_off()) {
            (true, false) => self.started_at_ms = Some(now_ms),
            (false, true) => {
                if let Some(start) = self.started_at_ms.take() {
                    self.last_run_ms = now_ms.saturating_sub(start);
                }
            }
            _ => {}
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at_ms.is_some()
    }

    /// Current run length while running, else the length of the last run.
    pub fn running_secs(&self, now_ms: u64) -> u64 {
        match self.started_at_ms {
            Some(start) => now_ms.saturating_sub(start) / 1000,
            None => self.last_run_ms / 1000,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Presentation state
// ───────────────────────────────────────────────────────────────

/// Live values carried in outbound notifications.
///
/// Kept in sync by the application service; the controller only reads it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Presentation {
    pub climate: ClimateReading,
    pub presence: PresenceReport,
    pub auto: AutoSettings,
    pub gesture_enabled: bool,
}

// ───────────────────────────────────────────────────────────────
// SpeedController
// ───────────────────────────────────────────────────────────────

pub struct SpeedController {
    current: Speed,
    default_speed: Speed,
    log: EventLog,
    run: RunTimer,
    webhook_url: WebhookUrl,
    presentation: Presentation,
    /// Rates behind the most recent AUTO activation, for the log entry.
    last_rise: Option<RiseRates>,
    notification_failures: u32,
}

impl SpeedController {
    /// Construct with the fan off.  Relays are not touched until the first
    /// transition; call [`apply_initial`](Self::apply_initial) at boot.
    pub fn new(default_speed: Speed, webhook_url: WebhookUrl) -> Self {
        Self {
            current: Speed::OFF,
            default_speed,
            log: EventLog::new(),
            run: RunTimer::default(),
            webhook_url,
            presentation: Presentation::default(),
            last_rise: None,
            notification_failures: 0,
        }
    }

    /// Drive the relays to match the current (off) speed.
    pub fn apply_initial(&self, hw: &mut impl ActuatorPort) {
        hw.set_relay_pattern(relay::encode(self.current));
    }

    // ── Commands ──────────────────────────────────────────────

    /// Validate and apply a speed change.
    ///
    /// Returns `Ok(true)` if the speed changed, `Ok(false)` if it already
    /// matched (nothing logged, written or sent).  Rejects out-of-range
    /// values without touching any state.
    pub fn request_speed(
        &mut self,
        new_speed: i32,
        cause: Cause,
        previous: Speed,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        net: &mut (impl WebhookPort + NotificationPort),
    ) -> Result<bool, ValidationError> {
        let target = Speed::try_from(new_speed)?;
        Ok(self.apply(target, cause, previous, now_ms, hw, net))
    }

    /// Manual request from the HTTP/UI layer.
    pub fn handle_api_request(
        &mut self,
        speed: i32,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        net: &mut (impl WebhookPort + NotificationPort),
    ) -> Result<bool, ValidationError> {
        let previous = self.current;
        self.request_speed(speed, Cause::Api, previous, now_ms, hw, net)
    }

    /// TAP toggles between off and the default speed; HOLD_STEP advances
    /// one stage, wrapping to off after the top stage.
    pub fn handle_gesture_event(
        &mut self,
        event: GestureEvent,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        net: &mut (impl WebhookPort + NotificationPort),
    ) -> bool {
        let previous = self.current;
        let target = match event {
            GestureEvent::Tap if previous.is_off() => self.default_speed,
            GestureEvent::Tap => Speed::OFF,
            GestureEvent::HoldStep => previous.next(),
        };
        self.apply(target, Cause::Gesture, previous, now_ms, hw, net)
    }

    /// AUTO_ACTIVATE switches to the default speed; DETECT only logs.
    pub fn handle_auto_event(
        &mut self,
        event: AutoEvent,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        net: &mut (impl WebhookPort + NotificationPort),
    ) -> bool {
        match event {
            AutoEvent::AutoActivate(rates) => {
                self.last_rise = Some(rates);
                let target = self.default_speed;
                self.apply(target, Cause::Auto, Speed::OFF, now_ms, hw, net)
            }
            AutoEvent::Detect(rates) => {
                let details = format!(
                    "Rise detected: temp {:+.1}C/min, hum {:+.1}%/min",
                    rates.temp_per_min, rates.hum_per_min
                );
                info!("DETECT | speed={} | {}", self.current, details);
                self.log
                    .append(LogEntry::new(now_ms, Cause::Detect, self.current, self.current, &details));
                false
            }
        }
    }

    /// Periodic webhook with the unchanged speed.  Never logged.
    pub fn send_heartbeat(&mut self, now_ms: u64, net: &mut impl WebhookPort) {
        let current = self.current;
        self.send_webhook(current, Cause::Periodic, current, now_ms, net);
    }

    /// Re-broadcast the current snapshot (e.g. after a sensor refresh).
    pub fn broadcast(&mut self, net: &mut impl NotificationPort) {
        let snapshot = self.snapshot();
        if let Err(e) = net.broadcast(&snapshot) {
            self.record_failure("broadcast", e);
        }
    }

    pub fn set_default_speed(&mut self, speed: i32) -> Result<(), ValidationError> {
        self.default_speed = Speed::try_from(speed)?;
        info!("Default speed set to {}", self.default_speed);
        Ok(())
    }

    pub fn set_webhook_url(&mut self, url: WebhookUrl) {
        self.webhook_url = url;
    }

    pub fn clear_logs(&mut self) {
        self.log.clear();
        info!("Event log cleared");
    }

    /// Mutable access for the service to refresh presented values.
    pub fn presentation_mut(&mut self) -> &mut Presentation {
        &mut self.presentation
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn current(&self) -> Speed {
        self.current
    }

    pub fn default_speed(&self) -> Speed {
        self.default_speed
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn logs(&self) -> impl Iterator<Item = &LogEntry> {
        self.log.newest_first()
    }

    pub fn run_timer(&self) -> &RunTimer {
        &self.run
    }

    pub fn running_time_secs(&self, now_ms: u64) -> u64 {
        self.run.running_secs(now_ms)
    }

    pub fn notification_failures(&self) -> u32 {
        self.notification_failures
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// State snapshot as pushed to UI clients.
    pub fn snapshot(&self) -> StateSnapshot {
        let p = &self.presentation;
        StateSnapshot {
            current_speed: self.current,
            temperature: p.climate.temperature_c,
            humidity: p.climate.humidity_pct,
            gesture_control_enabled: p.gesture_enabled,
            gesture_detected: p.presence.gesture_detected,
            hold_detected: p.presence.hold_detected,
            temp_rise_threshold: p.auto.temp_rise_threshold,
            hum_rise_threshold: p.auto.hum_rise_threshold,
            monitoring_interval: p.auto.monitoring_interval_ms,
            auto_activation_enabled: p.auto.enabled,
            distance: p.presence.distance_mm.map_or(-1, i32::from),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply(
        &mut self,
        target: Speed,
        cause: Cause,
        previous: Speed,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        net: &mut (impl WebhookPort + NotificationPort),
    ) -> bool {
        if target == self.current {
            debug!("{} request for speed {} ignored (unchanged)", cause, target);
            return false;
        }

        let from = self.current;
        let details = self.describe(cause, from, target);
        self.log.append(LogEntry::new(now_ms, cause, from, target, &details));
        hw.set_relay_pattern(relay::encode(target));
        self.run.on_transition(from, target, now_ms);
        self.current = target;
        info!("SPEED | {} -> {} | cause={} | {}", from, target, cause, details);

        // Webhook strictly before the snapshot for the same change.
        self.send_webhook(target, cause, previous, now_ms, net);
        self.broadcast(net);
        true
    }

    fn send_webhook(
        &mut self,
        speed: Speed,
        cause: Cause,
        previous: Speed,
        now_ms: u64,
        net: &mut impl WebhookPort,
    ) {
        if self.webhook_url.is_empty() {
            debug!("Webhook URL empty, skipping {} notification", cause);
            return;
        }
        let payload = WebhookPayload {
            speed,
            cause,
            previous_speed: previous,
            temperature: self.presentation.climate.temperature_c,
            humidity: self.presentation.climate.humidity_pct,
            running_time_seconds: self.run.running_secs(now_ms),
        };
        if let Err(e) = net.send(&self.webhook_url, &payload) {
            self.record_failure("webhook", e);
        }
    }

    fn record_failure(&mut self, what: &str, e: NotificationError) {
        self.notification_failures = self.notification_failures.saturating_add(1);
        warn!(
            "{} delivery failed: {} (total failures: {})",
            what, e, self.notification_failures
        );
    }

    fn describe(&mut self, cause: Cause, from: Speed, to: Speed) -> String {
        match cause {
            Cause::Gesture => {
                let action = if to.is_off() {
                    "turning off"
                } else if from.is_off() {
                    "turning on"
                } else {
                    "changing speed"
                };
                match self.presentation.presence.distance_mm {
                    Some(mm) => format!("Hand gesture - {action} (distance: {mm}mm)"),
                    None => format!("Hand gesture - {action} (distance: n/a)"),
                }
            }
            Cause::Auto => match self.last_rise.take() {
                Some(r) => format!(
                    "Auto activation: temp {:+.1}C/min, hum {:+.1}%/min",
                    r.temp_per_min, r.hum_per_min
                ),
                None => String::from("Auto activation"),
            },
            Cause::Api => format!("API request: {from} -> {to}"),
            Cause::Detect | Cause::Periodic => String::new(),
        }
    }
}
