//! GPIO pin assignments for the logger board (ESP32 DevKit).
//!
//! Single source of truth for every pin number.  The I²C pins are taken
//! as typed peripherals in `main`; their numbers are listed here for the
//! wiring table only.

// -----------------------------------------------------------------------
// Flow sensors (open-collector pulse outputs, falling edge)
// -----------------------------------------------------------------------

pub const FLOW1_PULSE_GPIO: i32 = 25;
pub const FLOW2_PULSE_GPIO: i32 = 26;

/// Indexed by flow channel.
pub const FLOW_PULSE_GPIOS: [i32; crate::config::FLOW_CHANNELS] = [FLOW1_PULSE_GPIO, FLOW2_PULSE_GPIO];

// -----------------------------------------------------------------------
// I²C bus (ADS1115)
// -----------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_FREQ_HZ: u32 = 400_000;
