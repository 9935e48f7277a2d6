//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements         | Connects to                    |
//! |------------------|--------------------|--------------------------------|
//! | `hardware`       | SensorPort         | BME280 + VL53L0X over I2C      |
//! |                  | ActuatorPort       | Relay GPIOs                    |
//! | `log_sink`       | EventSink          | Serial log output              |
//! | `net`            | WebhookPort        | Webhook channel → I/O thread   |
//! |                  | NotificationPort   | Snapshot channel → UI push     |
//! | `nvs`            | ConfigPort         | NVS / in-memory store          |
//! |                  | StoragePort        |                                |
//! | `time`           | (none)             | ESP32 system timer             |
//! | `webhook_task`   | (none)             | ESP-IDF HTTP client            |

pub mod hardware;
pub mod log_sink;
pub mod net;
pub mod nvs;
pub mod time;
pub mod webhook_task;
