//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, relays, HTTP, event sinks, storage) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes
//! them via generics, so the domain core never touches hardware directly.
//!
//! ## Notes
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - **WebhookPort** / **NotificationPort** are fire-and-forget: the domain
//!   records a failure and moves on.
//! - All port errors are typed; callers must handle every variant explicitly.

use crate::config::FanConfig;
use crate::control::relay::RelayPattern;
use crate::error::{NotificationError, ValidationError};
use crate::sensors::ClimateReading;

use super::events::{StateSnapshot, WebhookPayload};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Latest temperature / humidity.  Adapters return the previous good
    /// sample when a read fails, and `None` until a first read succeeds.
    fn read_climate(&mut self) -> Option<ClimateReading>;

    /// Hand distance in millimetres; `None` when the sensor has no data.
    fn read_distance(&mut self) -> Option<u16>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: drives the three motor-tap relays.
pub trait ActuatorPort {
    /// Apply all three output levels.
    fn set_relay_pattern(&mut self, pattern: RelayPattern);
}

// ───────────────────────────────────────────────────────────────
// Outbound notification ports (driven adapters: domain → network)
// ───────────────────────────────────────────────────────────────

/// HTTP POST of a JSON payload to the configured URL.
pub trait WebhookPort {
    fn send(&mut self, url: &str, payload: &WebhookPayload) -> Result<(), NotificationError>;
}

/// Push of the full state snapshot to connected UI clients.
pub trait NotificationPort {
    fn broadcast(&mut self, snapshot: &StateSnapshot) -> Result<(), NotificationError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists controller settings.
///
/// Implementations MUST validate before persisting.  Invalid values are
/// rejected with [`ConfigError::ValidationFailed`], never clamped.
pub trait ConfigPort {
    /// Load settings from persistent storage.
    /// Returns [`FanConfig::default()`] if nothing is stored.
    fn load(&self) -> Result<FanConfig, ConfigError>;

    /// Validate and persist settings.
    fn save(&self, config: &FanConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Namespaced key-value byte storage backing the settings adapter.
///
/// Writes MUST be atomic, with no partial writes on power loss.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Stored settings failed deserialization.
    Corrupted,
    /// A field failed range validation.
    ValidationFailed(ValidationError),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    NotFound,
    /// Value does not fit the caller's buffer.
    TooLarge,
    IoError,
}

impl From<ValidationError> for ConfigError {
    fn from(e: ValidationError) -> Self {
        Self::ValidationFailed(e)
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(e) => write!(f, "validation failed: {}", e),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::TooLarge => write!(f, "value too large"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
