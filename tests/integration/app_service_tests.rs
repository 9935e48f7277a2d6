//! End-to-end scenarios driven through `AppService::poll` with a simulated
//! clock, the way the firmware loop drives it.

use hoodfan::app::events::AppEvent;
use hoodfan::app::service::AppService;
use hoodfan::config::{FanConfig, parse_webhook_url};
use hoodfan::control::relay;
use hoodfan::control::speed::Speed;
use hoodfan::event_log::Cause;
use hoodfan::sensors::ClimateReading;

use crate::mock_hw::{LogSink, MockHardware, MockNet, Outbound};

/// Main loop pacing.
const STEP_MS: u64 = 10;

struct Rig {
    app: AppService,
    hw: MockHardware,
    net: MockNet,
    sink: LogSink,
    now: u64,
}

impl Rig {
    fn new(config: FanConfig) -> Self {
        let mut hw = MockHardware::new();
        let mut sink = LogSink::new();
        let mut app = AppService::new(config);
        app.start(&mut hw, &mut sink);
        Self {
            app,
            hw,
            net: MockNet::new(),
            sink,
            now: 0,
        }
    }

    fn with_webhook() -> Self {
        let mut cfg = FanConfig::default();
        cfg.webhook_url = parse_webhook_url("http://hooks.local/fan").unwrap();
        Self::new(cfg)
    }

    /// Advance the clock to `until` (exclusive), polling every step.
    fn run_until(&mut self, until: u64) {
        while self.now < until {
            self.now += STEP_MS;
            self.app.poll(self.now, &mut self.hw, &mut self.net, &mut self.sink);
        }
    }

    /// Hold a hand at `mm` from the next step until `until`, then remove it.
    fn present(&mut self, mm: u16, until: u64) {
        self.hw.distance = Some(mm);
        self.run_until(until);
        self.hw.distance = None;
    }

    fn speed(&self) -> u8 {
        self.app.current_speed().get()
    }
}

// ── QA-01: Boot ───────────────────────────────────────────────

#[test]
fn boot_releases_relays_and_announces() {
    let rig = Rig::new(FanConfig::default());
    assert_eq!(rig.hw.patterns, vec![relay::encode(Speed::OFF)]);
    assert!(matches!(
        rig.sink.events.first(),
        Some(AppEvent::Started {
            gesture_enabled: true,
            ..
        })
    ));
    assert_eq!(rig.speed(), 0);
}

// ── QA-02: Gestures ───────────────────────────────────────────

#[test]
fn short_presence_is_a_tap() {
    let mut rig = Rig::with_webhook();
    rig.run_until(990);
    rig.present(120, 2490);
    rig.run_until(2600);

    assert_eq!(rig.speed(), 1);
    let entry = rig.app.controller().log().latest().unwrap();
    assert_eq!(entry.cause, Cause::Gesture);
    assert!(entry.details.contains("turning on"));

    let hooks = rig.net.webhooks();
    assert_eq!(hooks.len(), 1);
    assert_eq!(hooks[0].cause, Cause::Gesture);
    assert_eq!(hooks[0].previous_speed, Speed::OFF);
}

#[test]
fn long_presence_steps_once_without_tap() {
    let mut rig = Rig::new(FanConfig::default());
    rig.run_until(990);
    // In range for ~3.2 s.
    rig.present(120, 4190);
    rig.run_until(4400);

    assert_eq!(rig.speed(), 1, "one hold step from off, no tap on release");
    assert_eq!(rig.app.controller().log().len(), 1);
    let changes: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::SpeedChanged { .. }))
        .collect();
    assert_eq!(changes.len(), 1);
}

#[test]
fn hold_keeps_stepping_every_three_seconds() {
    let mut rig = Rig::new(FanConfig::default());
    rig.run_until(990);
    // Steps at +3.05 s, +6.05 s and +9.05 s.
    rig.present(100, 10_200);
    rig.run_until(10_500);
    assert_eq!(rig.speed(), 3);
    assert_eq!(rig.app.controller().log().len(), 3);
}

#[test]
fn readings_outside_the_window_are_ignored() {
    let mut rig = Rig::new(FanConfig::default());
    rig.present(40, 2000);
    rig.present(250, 4000);
    rig.run_until(5000);
    assert_eq!(rig.speed(), 0);
    assert!(rig.app.controller().log().is_empty());
}

#[test]
fn disabled_gestures_are_not_polled() {
    let mut rig = Rig::new(FanConfig::default());
    rig.app.set_gesture_enabled(false, 0, &mut rig.sink);
    rig.present(120, 1500);
    rig.run_until(2000);

    assert_eq!(rig.hw.distance_reads, 0);
    assert_eq!(rig.speed(), 0);
    assert!(!rig.app.snapshot().gesture_control_enabled);
}

#[test]
fn disabling_mid_presence_drops_the_gesture() {
    let mut rig = Rig::new(FanConfig::default());
    rig.hw.distance = Some(120);
    rig.run_until(1000);
    assert!(rig.app.snapshot().gesture_detected);

    rig.app.set_gesture_enabled(false, rig.now, &mut rig.sink);
    rig.hw.distance = None;
    rig.run_until(1500);
    rig.app.set_gesture_enabled(true, rig.now, &mut rig.sink);
    rig.run_until(2000);

    assert_eq!(rig.speed(), 0);
    assert!(!rig.app.snapshot().gesture_detected);
}

// ── QA-03: Run timer ──────────────────────────────────────────

#[test]
fn tap_off_reports_run_length() {
    let mut rig = Rig::with_webhook();
    rig.run_until(990);
    rig.present(120, 2490);
    rig.run_until(9990);
    rig.present(120, 10_490);
    rig.run_until(10_600);

    assert_eq!(rig.speed(), 0);
    let gestures: Vec<_> = rig
        .net
        .webhooks()
        .into_iter()
        .filter(|p| p.cause == Cause::Gesture)
        .cloned()
        .collect();
    assert_eq!(gestures.len(), 2);
    assert_eq!(gestures[0].running_time_seconds, 0);
    // On at 2.5 s, off at 10.5 s.
    assert_eq!(gestures[1].running_time_seconds, 8);
    assert_eq!(gestures[1].previous_speed, Speed::LOW);
}

// ── QA-04: Auto activation ────────────────────────────────────

fn auto_rig() -> Rig {
    let mut cfg = FanConfig::default();
    cfg.auto.monitoring_interval_ms = 30_000;
    cfg.webhook_url = parse_webhook_url("http://hooks.local/fan").unwrap();
    Rig::new(cfg)
}

#[test]
fn fast_temperature_rise_switches_fan_on() {
    let mut rig = auto_rig();
    // Baseline seeded by the first climate tick at 1 s.
    rig.run_until(30_000);
    assert_eq!(rig.speed(), 0);

    rig.hw.climate = ClimateReading {
        temperature_c: 22.0,
        humidity_pct: 40.0,
    };
    rig.run_until(31_000);

    assert_eq!(rig.speed(), 1);
    let entry = rig.app.controller().log().latest().unwrap();
    assert_eq!(entry.cause, Cause::Auto);
    assert!(entry.details.contains("+4.0"), "details: {}", entry.details);

    let hook = rig.net.webhooks().into_iter().find(|p| p.cause == Cause::Auto).cloned().unwrap();
    assert_eq!(hook.previous_speed, Speed::OFF);
    assert_eq!(hook.temperature, 22.0);
}

#[test]
fn rise_while_running_only_logs() {
    let mut rig = auto_rig();
    rig.run_until(500);
    rig.app
        .request_speed(3, rig.now, &mut rig.hw, &mut rig.net, &mut rig.sink)
        .unwrap();
    rig.run_until(30_000);

    rig.hw.climate.humidity_pct = 45.0;
    rig.run_until(31_000);

    assert_eq!(rig.speed(), 3);
    let entry = rig.app.controller().log().latest().unwrap();
    assert_eq!(entry.cause, Cause::Detect);
    assert_eq!((entry.from_speed.get(), entry.to_speed.get()), (3, 3));
    assert!(rig.sink.events.iter().any(|e| matches!(e, AppEvent::RiseDetected { .. })));
}

#[test]
fn slow_rise_and_disabled_monitor_do_nothing() {
    let mut rig = auto_rig();
    rig.run_until(30_000);
    rig.hw.climate.temperature_c = 20.5;
    rig.run_until(62_000);
    assert_eq!(rig.speed(), 0);

    let mut off = rig.app.config().auto;
    off.enabled = false;
    rig.app.set_auto_settings(off, rig.now, &mut rig.sink).unwrap();
    rig.hw.climate.temperature_c = 30.0;
    rig.run_until(100_000);
    assert_eq!(rig.speed(), 0);
    assert!(!rig.app.snapshot().auto_activation_enabled);
}

#[test]
fn failed_first_climate_read_seeds_nothing() {
    let mut rig = auto_rig();
    rig.hw.climate = ClimateReading {
        temperature_c: 25.08,
        humidity_pct: 55.4,
    };
    rig.hw.failing_climate_reads = 1;
    rig.run_until(1000);
    assert_eq!(rig.net.snapshots().last().map(|s| s.temperature), Some(0.0));

    // Steady room from the second tick on; evaluations at 32 s and 62 s.
    rig.run_until(70_000);
    assert_eq!(rig.speed(), 0);
    assert!(rig.app.controller().log().is_empty());
    assert!(rig.net.webhooks().iter().all(|p| p.cause == Cause::Periodic));
    assert_eq!(rig.net.snapshots().last().map(|s| s.temperature), Some(25.08));
}

#[test]
fn climate_failures_keep_the_last_good_reading() {
    let mut rig = auto_rig();
    rig.run_until(10_000);

    rig.hw.failing_climate_reads = 3;
    rig.hw.climate.temperature_c = 40.0;
    rig.run_until(13_000);
    assert_eq!(rig.net.snapshots().last().map(|s| s.temperature), Some(20.0));
    assert_eq!(rig.speed(), 0);

    rig.run_until(14_000);
    assert_eq!(rig.net.snapshots().last().map(|s| s.temperature), Some(40.0));
}

// ── QA-05: Heartbeat and notifications ────────────────────────

#[test]
fn heartbeat_every_ten_seconds_is_not_logged() {
    let mut rig = Rig::with_webhook();
    rig.run_until(30_000);

    let beats: Vec<_> = rig.net.webhooks().into_iter().cloned().collect();
    assert_eq!(beats.len(), 3);
    assert!(beats.iter().all(|p| p.cause == Cause::Periodic && p.speed == p.previous_speed));
    assert!(rig.app.controller().log().is_empty());
}

#[test]
fn climate_refresh_broadcasts_snapshot() {
    let mut rig = Rig::new(FanConfig::default());
    rig.hw.climate = ClimateReading {
        temperature_c: 24.5,
        humidity_pct: 61.0,
    };
    rig.run_until(3000);

    let snaps = rig.net.snapshots();
    assert_eq!(snaps.len(), 3);
    assert_eq!(snaps[2].temperature, 24.5);
    assert_eq!(snaps[2].humidity, 61.0);
    assert_eq!(snaps[2].distance, -1);
}

#[test]
fn webhook_precedes_snapshot_for_a_change() {
    let mut rig = Rig::with_webhook();
    let changed = rig
        .app
        .request_speed(2, 100, &mut rig.hw, &mut rig.net, &mut rig.sink)
        .unwrap();
    assert!(changed);

    assert_eq!(rig.net.sent.len(), 2);
    assert!(matches!(&rig.net.sent[0], Outbound::Webhook(url, p) if url == "http://hooks.local/fan" && p.cause == Cause::Api));
    assert!(matches!(&rig.net.sent[1], Outbound::Snapshot(s) if s.current_speed.get() == 2));
}

#[test]
fn webhook_failure_keeps_the_new_speed() {
    let mut rig = Rig::with_webhook();
    rig.net.fail_webhooks = true;
    rig.app
        .request_speed(4, 100, &mut rig.hw, &mut rig.net, &mut rig.sink)
        .unwrap();

    assert_eq!(rig.speed(), 4);
    assert_eq!(rig.hw.last_pattern(), Some(relay::encode(Speed::MAX)));
    assert_eq!(rig.app.controller().notification_failures(), 1);
    assert_eq!(rig.net.snapshots().len(), 1);
}

// ── QA-06: Manual requests and log ────────────────────────────

#[test]
fn invalid_request_changes_nothing() {
    let mut rig = Rig::with_webhook();
    let writes = rig.hw.patterns.len();
    assert!(rig.app.request_speed(5, 0, &mut rig.hw, &mut rig.net, &mut rig.sink).is_err());
    assert!(rig.app.request_speed(-1, 0, &mut rig.hw, &mut rig.net, &mut rig.sink).is_err());
    assert_eq!(rig.hw.patterns.len(), writes);
    assert!(rig.net.sent.is_empty());
    assert!(rig.app.controller().log().is_empty());
}

#[test]
fn repeated_request_is_a_no_op() {
    let mut rig = Rig::with_webhook();
    assert_eq!(rig.app.request_speed(2, 0, &mut rig.hw, &mut rig.net, &mut rig.sink), Ok(true));
    assert_eq!(rig.app.request_speed(2, 10, &mut rig.hw, &mut rig.net, &mut rig.sink), Ok(false));
    assert_eq!(rig.app.controller().log().len(), 1);
    assert_eq!(rig.net.webhooks().len(), 1);
}

#[test]
fn logs_json_is_newest_first() {
    let mut rig = Rig::new(FanConfig::default());
    for (i, s) in [1, 2, 3].into_iter().enumerate() {
        rig.app
            .request_speed(s, i as u64 * 100, &mut rig.hw, &mut rig.net, &mut rig.sink)
            .unwrap();
    }
    let json: serde_json::Value = serde_json::from_str(&rig.app.logs_json().unwrap()).unwrap();
    let arr = json.as_array().unwrap();
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[0]["toSpeed"], 3);
    assert_eq!(arr[0]["cause"], "API");
    assert_eq!(arr[2]["toSpeed"], 1);

    rig.app.clear_logs();
    assert_eq!(rig.app.logs_json().unwrap(), "[]");
    assert_eq!(rig.speed(), 3, "clearing logs leaves the speed alone");
}
