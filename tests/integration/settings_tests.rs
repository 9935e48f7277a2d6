//! Settings persistence and command mailbox scenarios.

use hoodfan::app::commands::AppCommand;
use hoodfan::app::events::AppEvent;
use hoodfan::app::ports::ConfigPort;
use hoodfan::app::service::{AUTO_SAVE_DELAY_MS, AppService};
use hoodfan::channels::COMMAND_CHANNEL;
use hoodfan::config::FanConfig;
use hoodfan::error::ValidationError;

use crate::mock_hw::{LogSink, MockHardware, MockNet, MockNvs};

fn make_app() -> (AppService, MockHardware, MockNet, LogSink) {
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    let mut app = AppService::new(FanConfig::default());
    app.start(&mut hw, &mut sink);
    (app, hw, MockNet::new(), sink)
}

// ── QA-10: Debounced auto-save ────────────────────────────────

#[test]
fn change_is_saved_after_quiet_period() {
    let (mut app, _, _, mut sink) = make_app();
    let nvs = MockNvs::new();

    app.set_default_speed(3, 1_000).unwrap();
    assert!(app.is_config_dirty());
    assert!(!app.auto_save_if_needed(1_000 + AUTO_SAVE_DELAY_MS - 1, &nvs, &mut sink));
    assert!(app.auto_save_if_needed(1_000 + AUTO_SAVE_DELAY_MS, &nvs, &mut sink));

    assert_eq!(nvs.saves.get(), 1);
    assert!(!app.is_config_dirty());
    assert_eq!(nvs.load().unwrap().default_speed.get(), 3);
    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::SettingsSaved)));
}

#[test]
fn further_changes_restart_the_debounce() {
    let (mut app, _, _, mut sink) = make_app();
    let nvs = MockNvs::new();

    app.set_default_speed(2, 1_000).unwrap();
    app.set_webhook_url("https://example.org/hook", 4_000).unwrap();
    assert!(!app.auto_save_if_needed(6_000, &nvs, &mut sink));
    assert!(app.auto_save_if_needed(9_000, &nvs, &mut sink));
    assert_eq!(nvs.saves.get(), 1);
    assert_eq!(nvs.load().unwrap(), *app.config());
}

#[test]
fn failed_save_stays_dirty_and_retries() {
    let (mut app, _, _, mut sink) = make_app();
    let nvs = MockNvs::new();
    nvs.fail.set(true);

    app.set_gesture_enabled(false, 0, &mut sink);
    assert!(!app.auto_save_if_needed(10_000, &nvs, &mut sink));
    assert!(app.is_config_dirty());

    nvs.fail.set(false);
    assert!(app.auto_save_if_needed(10_010, &nvs, &mut sink));
    assert!(!nvs.load().unwrap().gesture_enabled);
}

#[test]
fn clean_settings_are_never_written() {
    let (mut app, _, _, mut sink) = make_app();
    let nvs = MockNvs::new();
    assert!(!app.auto_save_if_needed(60_000, &nvs, &mut sink));
    assert_eq!(nvs.saves.get(), 0);
}

#[test]
fn speed_requests_do_not_dirty_settings() {
    let (mut app, mut hw, mut net, mut sink) = make_app();
    app.request_speed(2, 0, &mut hw, &mut net, &mut sink).unwrap();
    app.clear_logs();
    assert!(!app.is_config_dirty());
}

// ── QA-11: Commands ───────────────────────────────────────────

#[test]
fn save_command_flushes_on_next_check() {
    let (mut app, mut hw, mut net, mut sink) = make_app();
    let nvs = MockNvs::new();
    let cmd = AppCommand::set_auto_settings(true, 1.5, 4.0, 20_000).unwrap();
    app.handle_command(cmd, 50_000, &mut hw, &mut net, &mut sink).unwrap();
    app.handle_command(AppCommand::SaveSettings, 50_000, &mut hw, &mut net, &mut sink)
        .unwrap();

    assert!(app.auto_save_if_needed(50_000, &nvs, &mut sink));
    let stored = nvs.load().unwrap();
    assert_eq!(stored.auto.monitoring_interval_ms, 20_000);
    assert_eq!(stored.auto.temp_rise_threshold, 1.5);
    assert_eq!(app.snapshot().monitoring_interval, 20_000);
}

#[test]
fn command_constructors_reject_bad_values() {
    assert_eq!(AppCommand::set_speed(5), Err(ValidationError::InvalidSpeed(5)));
    assert_eq!(
        AppCommand::set_auto_settings(true, 2.0, 5.0, 10),
        Err(ValidationError::MonitoringInterval(10))
    );
    assert_eq!(AppCommand::set_webhook_url("ftp://x"), Err(ValidationError::WebhookUrl));
}

#[test]
fn commands_round_trip_through_the_mailbox() {
    let (mut app, mut hw, mut net, mut sink) = make_app();

    COMMAND_CHANNEL.try_send(AppCommand::set_speed(3).unwrap()).unwrap();
    COMMAND_CHANNEL.try_send(AppCommand::SetGestureEnabled(false)).unwrap();
    COMMAND_CHANNEL
        .try_send(AppCommand::set_webhook_url("http://10.0.0.2/fan").unwrap())
        .unwrap();

    while let Ok(cmd) = COMMAND_CHANNEL.try_receive() {
        app.handle_command(cmd, 1_000, &mut hw, &mut net, &mut sink).unwrap();
    }

    assert_eq!(app.current_speed().get(), 3);
    assert!(!app.config().gesture_enabled);
    assert_eq!(app.config().webhook_url.as_str(), "http://10.0.0.2/fan");
    assert!(app.is_config_dirty());
}
