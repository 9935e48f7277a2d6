//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the speed controller, gesture recognizer,
//! environmental monitor, task cadence and live settings.  It exposes a
//! clean, hardware-agnostic API.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                  │          AppService           │
//! ActuatorPort ◀── │ Gesture · Monitor · Speed     │ ──▶ WebhookPort
//!                  └──────────────────────────────┘ ──▶ NotificationPort
//! ```

use log::{debug, info, warn};

use crate::config::{AutoSettings, FanConfig, parse_webhook_url};
use crate::control::speed::{Speed, SpeedController};
use crate::error::ValidationError;
use crate::event_log::{Cause, LogEntry};
use crate::scheduler::{Task, TaskScheduler};
use crate::sensors::environment::{AutoEvent, EnvironmentalMonitor};
use crate::sensors::gesture::GestureRecognizer;

use super::commands::AppCommand;
use super::events::{AppEvent, StateSnapshot};
use super::ports::{ActuatorPort, ConfigPort, EventSink, NotificationPort, SensorPort, WebhookPort};

/// Settings are written back this long after the last change.
pub const AUTO_SAVE_DELAY_MS: u64 = 5_000;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    controller: SpeedController,
    gestures: GestureRecognizer,
    monitor: EnvironmentalMonitor,
    scheduler: TaskScheduler,
    config: FanConfig,
    config_dirty: bool,
    dirty_since_ms: u64,
}

impl AppService {
    /// Construct the service from persisted settings.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: FanConfig) -> Self {
        let mut controller = SpeedController::new(config.default_speed, config.webhook_url.clone());
        let p = controller.presentation_mut();
        p.auto = config.auto;
        p.gesture_enabled = config.gesture_enabled;

        let mut scheduler = TaskScheduler::new();
        scheduler.set_enabled(Task::GesturePoll, config.gesture_enabled);

        Self {
            controller,
            gestures: GestureRecognizer::new(),
            monitor: EnvironmentalMonitor::new(config.auto),
            scheduler,
            config,
            config_dirty: false,
            dirty_since_ms: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Release every relay and announce the boot settings.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.controller.apply_initial(hw);
        sink.emit(&AppEvent::Started {
            default_speed: self.config.default_speed,
            gesture_enabled: self.config.gesture_enabled,
        });
        info!("AppService started (default speed {})", self.config.default_speed);
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// Run every task whose cadence has elapsed.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn poll(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        net: &mut (impl WebhookPort + NotificationPort),
        sink: &mut impl EventSink,
    ) {
        for task in self.scheduler.due(now_ms) {
            match task {
                Task::GesturePoll => self.poll_gesture(now_ms, hw, net, sink),
                Task::ClimateTick => self.climate_tick(now_ms, hw, net, sink),
                Task::Heartbeat => self.controller.send_heartbeat(now_ms, net),
            }
        }
    }

    fn poll_gesture(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        net: &mut (impl WebhookPort + NotificationPort),
        sink: &mut impl EventSink,
    ) {
        let distance = hw.read_distance();
        let event = self.gestures.poll(distance, now_ms);
        self.controller.presentation_mut().presence = self.gestures.report();

        if let Some(event) = event {
            let from = self.controller.current();
            if self.controller.handle_gesture_event(event, now_ms, hw, net) {
                sink.emit(&AppEvent::SpeedChanged {
                    from,
                    to: self.controller.current(),
                    cause: Cause::Gesture,
                });
            }
        }
    }

    fn climate_tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        net: &mut (impl WebhookPort + NotificationPort),
        sink: &mut impl EventSink,
    ) {
        // No sample yet: nothing to present, and no baseline may be seeded.
        let Some(reading) = hw.read_climate() else {
            debug!("Climate: no reading yet, skipping monitor tick");
            self.controller.broadcast(net);
            return;
        };
        self.controller.presentation_mut().climate = reading;

        let from = self.controller.current();
        if let Some(event) = self.monitor.tick(reading, now_ms, from) {
            if let AutoEvent::Detect(r) = event {
                sink.emit(&AppEvent::RiseDetected {
                    temp_per_min: r.temp_per_min,
                    hum_per_min: r.hum_per_min,
                });
            }
            if self.controller.handle_auto_event(event, now_ms, hw, net) {
                sink.emit(&AppEvent::SpeedChanged {
                    from,
                    to: self.controller.current(),
                    cause: Cause::Auto,
                });
            }
        }

        self.controller.broadcast(net);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (HTTP handler, UI socket, console).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        net: &mut (impl WebhookPort + NotificationPort),
        sink: &mut impl EventSink,
    ) -> Result<(), ValidationError> {
        match cmd {
            AppCommand::SetSpeed(speed) => {
                self.request_speed(i32::from(speed.get()), now_ms, hw, net, sink)?;
            }
            AppCommand::SetDefaultSpeed(speed) => self.set_default_speed(i32::from(speed.get()), now_ms)?,
            AppCommand::SetAutoSettings(settings) => self.set_auto_settings(settings, now_ms, sink)?,
            AppCommand::SetGestureEnabled(enabled) => self.set_gesture_enabled(enabled, now_ms, sink),
            AppCommand::SetWebhookUrl(url) => self.set_webhook_url(&url, now_ms)?,
            AppCommand::ClearLogs => self.clear_logs(),
            AppCommand::SaveSettings => {
                self.mark_config_dirty(now_ms.saturating_sub(AUTO_SAVE_DELAY_MS));
                info!("Explicit settings save requested (will flush on next auto-save check)");
            }
        }
        Ok(())
    }

    /// Manual speed request.  `Ok(false)` when the speed already matched.
    pub fn request_speed(
        &mut self,
        speed: i32,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        net: &mut (impl WebhookPort + NotificationPort),
        sink: &mut impl EventSink,
    ) -> Result<bool, ValidationError> {
        let from = self.controller.current();
        let changed = self.controller.handle_api_request(speed, now_ms, hw, net)?;
        if changed {
            sink.emit(&AppEvent::SpeedChanged {
                from,
                to: self.controller.current(),
                cause: Cause::Api,
            });
        }
        Ok(changed)
    }

    pub fn set_default_speed(&mut self, speed: i32, now_ms: u64) -> Result<(), ValidationError> {
        self.controller.set_default_speed(speed)?;
        self.config.default_speed = self.controller.default_speed();
        self.mark_config_dirty(now_ms);
        Ok(())
    }

    pub fn set_auto_settings(
        &mut self,
        settings: AutoSettings,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Result<(), ValidationError> {
        settings.validate()?;
        self.monitor.set_settings(settings);
        self.controller.presentation_mut().auto = settings;
        self.config.auto = settings;
        self.mark_config_dirty(now_ms);
        sink.emit(&AppEvent::AutoSettingsChanged(settings));
        Ok(())
    }

    /// Disabling drops any presence in progress without emitting a gesture.
    pub fn set_gesture_enabled(&mut self, enabled: bool, now_ms: u64, sink: &mut impl EventSink) {
        if !enabled {
            self.gestures.reset();
        }
        self.scheduler.set_enabled(Task::GesturePoll, enabled);
        let p = self.controller.presentation_mut();
        p.gesture_enabled = enabled;
        p.presence = self.gestures.report();
        self.config.gesture_enabled = enabled;
        self.mark_config_dirty(now_ms);
        sink.emit(&AppEvent::GestureControl(enabled));
    }

    pub fn set_webhook_url(&mut self, url: &str, now_ms: u64) -> Result<(), ValidationError> {
        let url = parse_webhook_url(url)?;
        self.controller.set_webhook_url(url.clone());
        self.config.webhook_url = url;
        self.mark_config_dirty(now_ms);
        Ok(())
    }

    pub fn clear_logs(&mut self) {
        self.controller.clear_logs();
    }

    // ── Queries ───────────────────────────────────────────────

    /// Event log, newest first.
    pub fn logs(&self) -> impl Iterator<Item = &LogEntry> {
        self.controller.logs()
    }

    /// Event log as a JSON array, newest first.
    pub fn logs_json(&self) -> Result<String, serde_json::Error> {
        self.controller.log().to_json()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.controller.snapshot()
    }

    pub fn current_speed(&self) -> Speed {
        self.controller.current()
    }

    pub fn controller(&self) -> &SpeedController {
        &self.controller
    }

    /// Live settings (for read-back or persistence).
    pub fn config(&self) -> &FanConfig {
        &self.config
    }

    // ── Config dirty-flag management ──────────────────────────

    /// Mark the settings as modified at `now_ms`; restarts the debounce.
    pub fn mark_config_dirty(&mut self, now_ms: u64) {
        self.config_dirty = true;
        self.dirty_since_ms = now_ms;
    }

    /// Save once the settings have been stable for [`AUTO_SAVE_DELAY_MS`].
    /// Returns `true` if the settings were saved.
    pub fn auto_save_if_needed(&mut self, now_ms: u64, storage: &impl ConfigPort, sink: &mut impl EventSink) -> bool {
        if !self.config_dirty || now_ms.saturating_sub(self.dirty_since_ms) < AUTO_SAVE_DELAY_MS {
            return false;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                sink.emit(&AppEvent::SettingsSaved);
                true
            }
            Err(e) => {
                // Stay dirty; retried on the next check.
                warn!("Settings auto-save failed: {}", e);
                false
            }
        }
    }

    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}
