//! ADS1115 16-bit I²C ADC.
//!
//! Used in single-shot, single-ended mode on AIN0..AIN3 with the PGA at
//! gain 2/3 (±6.144 V) and 128 SPS.  Each read writes the config register
//! to start a conversion, polls the OS bit until the conversion is done
//! and then fetches the signed result.
//!
//! Generic over the `embedded-hal` 1.0 I²C and delay traits so the register
//! protocol is tested on the host against a simulated bus.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::PressurePort;
use crate::config::PRESSURE_CHANNELS;
use crate::error::SensorError;

/// Register pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Conversion = 0x00,
    Config = 0x01,
}

/// OS bit: write 1 to start a conversion, reads 1 when idle.
const OS_SINGLE: u16 = 0x8000;
/// MUX = 1xx: AINx against GND.
const MUX_SINGLE_ENDED_BASE: u16 = 0b100;
const MUX_SHIFT: u16 = 12;
/// PGA = 000: FSR ±6.144 V.
const PGA_6_144V: u16 = 0b000 << 9;
const MODE_SINGLE_SHOT: u16 = 0x0100;
/// DR = 100: 128 SPS.
const DR_128SPS: u16 = 0b100 << 5;
/// COMP_QUE = 11: comparator disabled.
const COMP_DISABLED: u16 = 0x0003;

/// 1 ms polls; a 128 SPS conversion takes about 8 ms.
const POLL_INTERVAL_US: u32 = 1_000;
const POLL_ATTEMPTS: u32 = 20;

/// Config word that starts a single-shot conversion on `channel`.
pub const fn config_word(channel: u8) -> u16 {
    OS_SINGLE
        | ((MUX_SINGLE_ENDED_BASE + channel as u16) << MUX_SHIFT)
        | PGA_6_144V
        | MODE_SINGLE_SHOT
        | DR_128SPS
        | COMP_DISABLED
}

pub struct Ads1115<I, D> {
    i2c: I,
    delay: D,
    address: u8,
}

impl<I: I2c, D: DelayNs> Ads1115<I, D> {
    /// Check that a device answers at `address`.  Fails with
    /// [`SensorError::AdcNotFound`] on a NACK or bus error.
    pub fn probe(i2c: I, delay: D, address: u8) -> Result<Self, SensorError> {
        let mut adc = Self { i2c, delay, address };
        match adc.read_register(Register::Config) {
            Ok(cfg) => {
                info!("ads1115: found at 0x{:02x} (config 0x{:04x})", address, cfg);
                Ok(adc)
            }
            Err(_) => {
                warn!("ads1115: no answer at 0x{:02x}", address);
                Err(SensorError::AdcNotFound)
            }
        }
    }

    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn write_register(&mut self, reg: Register, value: u16) -> Result<(), SensorError> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[reg as u8, hi, lo])
            .map_err(|_| SensorError::AdcReadFailed)
    }

    fn read_register(&mut self, reg: Register) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg as u8], &mut buf)
            .map_err(|_| SensorError::AdcReadFailed)?;
        Ok(u16::from_be_bytes(buf))
    }
}

impl<I: I2c, D: DelayNs> PressurePort for Ads1115<I, D> {
    fn read_raw(&mut self, channel: u8) -> Result<i16, SensorError> {
        if usize::from(channel) >= PRESSURE_CHANNELS {
            return Err(SensorError::InvalidChannel);
        }
        self.write_register(Register::Config, config_word(channel))?;

        for _ in 0..POLL_ATTEMPTS {
            self.delay.delay_us(POLL_INTERVAL_US);
            if self.read_register(Register::Config)? & OS_SINGLE != 0 {
                let raw = self.read_register(Register::Conversion)?;
                return Ok(raw as i16);
            }
        }
        Err(SensorError::AdcTimeout)
    }
}
