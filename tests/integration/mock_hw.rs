//! Mock adapters for integration tests.
//!
//! Records every actuator and outbound call so tests can assert on the
//! full history without touching real GPIO, I2C or the network.

use std::cell::{Cell, RefCell};

use hoodfan::app::events::{AppEvent, StateSnapshot, WebhookPayload};
use hoodfan::app::ports::{ActuatorPort, ConfigError, ConfigPort, EventSink, NotificationPort, SensorPort, WebhookPort};
use hoodfan::config::FanConfig;
use hoodfan::control::relay::RelayPattern;
use hoodfan::error::NotificationError;
use hoodfan::sensors::ClimateReading;

// ── MockHardware ──────────────────────────────────────────────

/// Scripted sensors plus a relay write history.
///
/// Climate reads behave like the sensor hub: while
/// `failing_climate_reads` is non-zero a read fails and the last good
/// sample (or nothing) is returned.
pub struct MockHardware {
    pub climate: ClimateReading,
    pub failing_climate_reads: u32,
    last_climate: Option<ClimateReading>,
    pub distance: Option<u16>,
    pub patterns: Vec<RelayPattern>,
    pub distance_reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            climate: ClimateReading {
                temperature_c: 20.0,
                humidity_pct: 40.0,
            },
            failing_climate_reads: 0,
            last_climate: None,
            distance: None,
            patterns: Vec::new(),
            distance_reads: 0,
        }
    }

    pub fn last_pattern(&self) -> Option<RelayPattern> {
        self.patterns.last().copied()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_climate(&mut self) -> Option<ClimateReading> {
        if self.failing_climate_reads > 0 {
            self.failing_climate_reads -= 1;
            return self.last_climate;
        }
        self.last_climate = Some(self.climate);
        self.last_climate
    }

    fn read_distance(&mut self) -> Option<u16> {
        self.distance_reads += 1;
        self.distance
    }
}

impl ActuatorPort for MockHardware {
    fn set_relay_pattern(&mut self, pattern: RelayPattern) {
        self.patterns.push(pattern);
    }
}

// ── MockNet ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Webhook(String, WebhookPayload),
    Snapshot(StateSnapshot),
}

#[derive(Default)]
pub struct MockNet {
    pub sent: Vec<Outbound>,
    pub fail_webhooks: bool,
    pub fail_broadcasts: bool,
}

#[allow(dead_code)]
impl MockNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn webhooks(&self) -> Vec<&WebhookPayload> {
        self.sent
            .iter()
            .filter_map(|o| match o {
                Outbound::Webhook(_, p) => Some(p),
                Outbound::Snapshot(_) => None,
            })
            .collect()
    }

    pub fn snapshots(&self) -> Vec<&StateSnapshot> {
        self.sent
            .iter()
            .filter_map(|o| match o {
                Outbound::Snapshot(s) => Some(s),
                Outbound::Webhook(..) => None,
            })
            .collect()
    }
}

impl WebhookPort for MockNet {
    fn send(&mut self, url: &str, payload: &WebhookPayload) -> Result<(), NotificationError> {
        if self.fail_webhooks {
            return Err(NotificationError::Connect);
        }
        self.sent.push(Outbound::Webhook(url.to_owned(), payload.clone()));
        Ok(())
    }
}

impl NotificationPort for MockNet {
    fn broadcast(&mut self, snapshot: &StateSnapshot) -> Result<(), NotificationError> {
        if self.fail_broadcasts {
            return Err(NotificationError::QueueFull);
        }
        self.sent.push(Outbound::Snapshot(snapshot.clone()));
        Ok(())
    }
}

// ── MockNvs ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockNvs {
    pub stored: RefCell<Option<FanConfig>>,
    pub saves: Cell<u32>,
    pub fail: Cell<bool>,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigPort for MockNvs {
    fn load(&self) -> Result<FanConfig, ConfigError> {
        Ok(self.stored.borrow().clone().unwrap_or_default())
    }

    fn save(&self, config: &FanConfig) -> Result<(), ConfigError> {
        if self.fail.get() {
            return Err(ConfigError::IoError);
        }
        hoodfan::config::validate_config(config)?;
        *self.stored.borrow_mut() = Some(config.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

// ── LogSink ───────────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
