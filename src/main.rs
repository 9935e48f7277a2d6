//! HoodFan firmware entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   NetAdapter      │
//! │  (Sensor+Actuator) (EventSink)    (Config)     (Webhook+Push)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Gesture · Monitor · SpeedController · EventLog        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  COMMAND_CHANNEL ──▶ loop ──▶ SNAPSHOT_CHANNEL                 │
//! │                        └────▶ WEBHOOK_CHANNEL ──▶ webhook task │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::{Delay, FreeRtos};
use esp_idf_hal::gpio::{OutputPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use hoodfan::adapters::hardware::HardwareAdapter;
use hoodfan::adapters::log_sink::LogEventSink;
use hoodfan::adapters::net::NetAdapter;
use hoodfan::adapters::nvs::NvsAdapter;
use hoodfan::adapters::time::MonotonicClock;
use hoodfan::adapters::webhook_task::{self, WebhookClient};
use hoodfan::app::ports::ConfigPort;
use hoodfan::app::service::AppService;
use hoodfan::channels::{COMMAND_CHANNEL, SNAPSHOT_CHANNEL};
use hoodfan::config::FanConfig;
use hoodfan::pins;

/// Loop pacing; the gesture cadence (50 ms) is the fastest task.
const LOOP_SLEEP_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  HoodFan v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;

    // ── 2. Load settings from NVS (or defaults) ───────────────
    let nvs = NvsAdapter::new(EspDefaultNvsPartition::take()?);
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Settings load failed ({}), using defaults", e);
            FanConfig::default()
        }
    };

    // ── 3. Hardware ───────────────────────────────────────────
    info!(
        "Relays on GPIO {}/{}/{}, I2C SDA {} SCL {}",
        pins::RELAY_1_GPIO,
        pins::RELAY_2_GPIO,
        pins::RELAY_3_GPIO,
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO
    );
    let relay_pins = [
        PinDriver::output(peripherals.pins.gpio5.downgrade_output())?,
        PinDriver::output(peripherals.pins.gpio32.downgrade_output())?,
        PinDriver::output(peripherals.pins.gpio33.downgrade_output())?,
    ];
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio14,
        peripherals.pins.gpio15,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ)),
    )?;
    let mut hw = HardwareAdapter::new(
        i2c,
        Delay::new_default(),
        relay_pins,
        pins::BME280_ADDR,
        pins::VL53L0X_ADDR,
    )
    .map_err(|e| anyhow::anyhow!("hardware init failed: {e}"))?;

    // ── 4. Webhook delivery thread ────────────────────────────
    webhook_task::spawn(WebhookClient::new())?;

    // ── 5. Application core ───────────────────────────────────
    let mut net = NetAdapter::new();
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();
    let mut app = AppService::new(config);
    app.start(&mut hw, &mut sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();

        while let Ok(cmd) = COMMAND_CHANNEL.try_receive() {
            if let Err(e) = app.handle_command(cmd, now_ms, &mut hw, &mut net, &mut sink) {
                warn!("Command rejected: {}", e);
            }
        }

        app.poll(now_ms, &mut hw, &mut net, &mut sink);
        app.auto_save_if_needed(now_ms, &nvs, &mut sink);

        // No UI transport in this build; keep the push channel moving.
        while let Ok(snapshot) = SNAPSHOT_CHANNEL.try_receive() {
            log::debug!("UI snapshot: speed={} distance={}", snapshot.current_speed, snapshot.distance);
        }

        FreeRtos::delay_ms(LOOP_SLEEP_MS);
    }
}
