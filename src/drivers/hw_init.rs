//! One-shot hardware peripheral initialization.
//!
//! Configures the two flow pulse inputs and installs their GPIO interrupt
//! handlers using raw ESP-IDF sys calls.  Called once from `main()` before
//! the main loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrAddFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrAddFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

impl From<HwInitError> for crate::error::Error {
    fn from(_: HwInitError) -> Self {
        Self::Init("flow inputs")
    }
}

// ── Flow pulse inputs ─────────────────────────────────────────

/// ISR trampoline.  `arg` carries the channel index, not a pointer.
#[cfg(target_os = "espidf")]
unsafe extern "C" fn flow_gpio_isr(arg: *mut core::ffi::c_void) {
    crate::sensors::flow::flow_isr_handler(arg as usize);
}

/// Configure both flow inputs (pull-up, falling edge) and attach the
/// pulse ISR.
#[cfg(target_os = "espidf")]
pub fn init_flow_inputs() -> Result<(), HwInitError> {
    // SAFETY: called once from main() before the loop; the handlers only
    // bump the atomic edge counters.
    unsafe {
        for &pin in &pins::FLOW_PULSE_GPIOS {
            let cfg = gpio_config_t {
                pin_bit_mask: 1u64 << pin,
                mode: gpio_mode_t_GPIO_MODE_INPUT,
                pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
                pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
                intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
            };
            let ret = gpio_config(&cfg);
            if ret != ESP_OK as i32 {
                return Err(HwInitError::GpioConfigFailed(ret));
            }
        }

        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        for (channel, &pin) in pins::FLOW_PULSE_GPIOS.iter().enumerate() {
            let ret = gpio_isr_handler_add(pin, Some(flow_gpio_isr), channel as *mut core::ffi::c_void);
            if ret != ESP_OK as i32 {
                return Err(HwInitError::IsrAddFailed(ret));
            }
            gpio_intr_enable(pin);
        }
    }
    info!(
        "hw_init: flow inputs on GPIO {:?} (pull-up, falling edge)",
        pins::FLOW_PULSE_GPIOS
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_flow_inputs() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): flow inputs skipped");
    Ok(())
}
