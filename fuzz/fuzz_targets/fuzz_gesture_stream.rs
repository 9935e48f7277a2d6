//! Fuzz target: gesture recognizer
//!
//! Feeds arbitrary distance samples at arbitrary (monotonic) spacing and
//! verifies:
//! - No panics
//! - A TAP is only emitted on the sample that leaves the window
//! - HOLD steps are at least `HOLD_STEP_MS` apart
//!
//! cargo fuzz run fuzz_gesture_stream

#![no_main]

use hoodfan::sensors::gesture::{GestureEvent, GestureRecognizer, GestureState, HOLD_STEP_MS};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut g = GestureRecognizer::new();
    let mut now: u64 = 0;
    let mut last_step: Option<u64> = None;

    // 4 bytes per sample: u16 distance (0xFFFF = no data), u16 delta ms.
    for chunk in data.chunks_exact(4) {
        let raw = u16::from_le_bytes([chunk[0], chunk[1]]);
        let delta = u16::from_le_bytes([chunk[2], chunk[3]]);
        now += u64::from(delta);
        let distance = (raw != u16::MAX).then_some(raw);

        let was_in_range = matches!(g.state(), GestureState::InRange { .. });
        match g.poll(distance, now) {
            Some(GestureEvent::Tap) => {
                assert!(was_in_range);
                assert_eq!(g.state(), GestureState::OutOfRange);
                last_step = None;
            }
            Some(GestureEvent::HoldStep) => {
                if let Some(prev) = last_step {
                    assert!(now - prev >= HOLD_STEP_MS);
                }
                last_step = Some(now);
            }
            None => {
                if g.state() == GestureState::OutOfRange {
                    last_step = None;
                }
            }
        }
    }
});
