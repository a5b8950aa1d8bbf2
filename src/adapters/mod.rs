//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements    | Connects to                    |
//! |-------------|---------------|--------------------------------|
//! | `http`      | -             | ESP-IDF httpd → `app::api`     |
//! | `log_sink`  | EventSink     | Serial log output              |
//! | `log_store` | LogStorePort  | SPIFFS via `std::fs`           |
//! | `time`      | -             | ESP32 high-resolution timer    |
//! | `wifi`      | -             | ESP-IDF WiFi soft AP           |
//!
//! The ADS1115 driver in `drivers` implements `PressurePort` directly.

pub mod http;
pub mod log_sink;
pub mod log_store;
pub mod time;
pub mod wifi;
