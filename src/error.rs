//! Error types for the HoodFan firmware.
//!
//! All variants are `Copy` so they can be passed through the controller and
//! adapters without allocation.
//!
//! Only [`ValidationError`] ever reaches the caller of a command; sensor and
//! notification failures are handled where they occur.  [`Error`] covers
//! hardware bring-up, the one path that can fail as a whole.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Hardware bring-up failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be detected or configured.
    Sensor(SensorError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Synchronous rejection of an out-of-range command argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    /// Speed outside 0..=4.
    InvalidSpeed(i32),
    /// Temperature rise threshold not finite or outside the allowed band.
    TempThreshold(f32),
    /// Humidity rise threshold not finite or outside the allowed band.
    HumThreshold(f32),
    /// Monitoring interval (ms) outside the allowed band.
    MonitoringInterval(u32),
    /// Webhook URL too long or not http(s).
    WebhookUrl,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSpeed(s) => write!(f, "invalid speed {s} (expected 0-4)"),
            Self::TempThreshold(t) => write!(f, "invalid temperature threshold {t}"),
            Self::HumThreshold(h) => write!(f, "invalid humidity threshold {h}"),
            Self::MonitoringInterval(ms) => write!(f, "invalid monitoring interval {ms} ms"),
            Self::WebhookUrl => write!(f, "invalid webhook URL"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// I2C transaction failed.
    Bus,
    /// Chip ID register did not match the expected part.
    WrongChip(u8),
    /// Measurement did not complete in time.
    Timeout,
    /// Reading outside the physically plausible range (or no target).
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "I2C bus error"),
            Self::WrongChip(id) => write!(f, "unexpected chip id 0x{id:02x}"),
            Self::Timeout => write!(f, "measurement timeout"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Notification errors
// ---------------------------------------------------------------------------

/// Outbound delivery failures.  Recorded, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationError {
    /// HTTP connection could not be established.
    Connect,
    /// Request did not complete within the 5 s budget.
    Timeout,
    /// Server answered with a non-2xx status.
    Status(u16),
    /// Payload could not be serialised.
    Encode,
    /// Outbound queue is full; the snapshot or webhook was dropped.
    QueueFull,
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect failed"),
            Self::Timeout => write!(f, "timed out"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Encode => write!(f, "payload encoding failed"),
            Self::QueueFull => write!(f, "outbound queue full"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
