//! Contactless gesture recognition over time-of-flight distance samples.
//!
//! Polled at a fixed ~50 ms cadence by the control loop.  A hand held
//! 50–200 mm above the sensor is "in range".
//!
//! ## Gestures
//!
//! | Gesture   | Condition                                           | Event      |
//! |-----------|-----------------------------------------------------|------------|
//! | Tap       | Hand leaves range ≤ 3 s after entering              | `Tap`      |
//! | Hold step | In range > 3 s, then every further 3 s since last   | `HoldStep` |
//!
//! A missing reading ("no data" from the sensor) counts as out of range.
//! The recognizer only classifies; it never touches the fan.

use log::debug;

/// Closest distance that counts as a hand over the sensor (mm).
pub const RANGE_MIN_MM: u16 = 50;
/// Farthest distance that counts as a hand over the sensor (mm).
pub const RANGE_MAX_MM: u16 = 200;
/// Presence longer than this is a hold, not a tap.
pub const HOLD_THRESHOLD_MS: u64 = 3000;
/// Spacing between consecutive hold steps.
pub const HOLD_STEP_MS: u64 = 3000;
/// Sensor poll cadence used by the scheduler.
pub const POLL_INTERVAL_MS: u64 = 50;

/// Classified gesture handed to the speed controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// Short presence: toggle off ↔ default speed.
    Tap,
    /// Sustained presence: advance one speed stage.
    HoldStep,
}

/// Recognizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    OutOfRange,
    InRange {
        presence_start_ms: u64,
        last_step_ms: u64,
    },
}

/// Presence flags and last distance, for telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceReport {
    /// A hand is currently in range.
    pub gesture_detected: bool,
    /// At least one hold step fired during the current presence.
    pub hold_detected: bool,
    /// Last reported distance; `None` when the sensor had no data.
    pub distance_mm: Option<u16>,
}

pub struct GestureRecognizer {
    state: GestureState,
    hold_detected: bool,
    last_distance_mm: Option<u16>,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self {
            state: GestureState::OutOfRange,
            hold_detected: false,
            last_distance_mm: None,
        }
    }

    /// Feed one distance sample taken at `now_ms`.
    /// Returns a classified gesture, if any.
    pub fn poll(&mut self, distance_mm: Option<u16>, now_ms: u64) -> Option<GestureEvent> {
        self.last_distance_mm = distance_mm;
        let in_range = distance_mm.is_some_and(|d| (RANGE_MIN_MM..=RANGE_MAX_MM).contains(&d));

        match (self.state, in_range) {
            (GestureState::OutOfRange, false) => None,

            (GestureState::OutOfRange, true) => {
                self.state = GestureState::InRange {
                    presence_start_ms: now_ms,
                    last_step_ms: now_ms,
                };
                None
            }

            (
                GestureState::InRange {
                    presence_start_ms,
                    last_step_ms,
                },
                true,
            ) => {
                let held = now_ms.saturating_sub(presence_start_ms);
                let since_step = now_ms.saturating_sub(last_step_ms);
                if held > HOLD_THRESHOLD_MS && since_step >= HOLD_STEP_MS {
                    self.state = GestureState::InRange {
                        presence_start_ms,
                        last_step_ms: now_ms,
                    };
                    self.hold_detected = true;
                    debug!("Gesture: hold step after {} ms", held);
                    return Some(GestureEvent::HoldStep);
                }
                None
            }

            (GestureState::InRange { presence_start_ms, .. }, false) => {
                let held = now_ms.saturating_sub(presence_start_ms);
                self.state = GestureState::OutOfRange;
                self.hold_detected = false;
                if held <= HOLD_THRESHOLD_MS {
                    debug!("Gesture: tap ({} ms)", held);
                    Some(GestureEvent::Tap)
                } else {
                    None
                }
            }
        }
    }

    /// Drop any presence in progress without emitting an event.
    pub fn reset(&mut self) {
        self.state = GestureState::OutOfRange;
        self.hold_detected = false;
        self.last_distance_mm = None;
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn report(&self) -> PresenceReport {
        PresenceReport {
            gesture_detected: matches!(self.state, GestureState::InRange { .. }),
            hold_detected: self.hold_detected,
            distance_mm: self.last_distance_mm,
        }
    }
}
