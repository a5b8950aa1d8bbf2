//! Pulse-output flow sensors: interrupt-side counting and 1 Hz rate estimation.
//!
//! Each sensor emits one falling edge per fixed volume of liquid.  The GPIO
//! ISR calls [`flow_isr_handler`], which bumps the channel's `AtomicU32`
//! edge count.  That single lock-free increment is all the ISR does, so it
//! is safe on either core and at any interrupt priority.
//!
//! The main loop owns everything else.  [`PulseCounter::take_delta`] loads
//! the count once and advances the caller's previous snapshot to it; an
//! edge that lands after the load is part of the next interval, so every
//! edge is counted in exactly one interval.  The ESP32 has no 64-bit
//! atomics, so counts are `u32` and all differences are wrapping.
//!
//! The volume total is the count minus the count at the last clear.  It is
//! derived from the same load as the pulse count, so it is exactly
//! `volume_pulses × liters_per_pulse` at any instant.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::{FLOW_CHANNELS, LoggerConfig};

/// Interrupt-safe edge counter for one flow channel.
pub struct PulseCounter {
    /// Edges since boot, wrapping.  Written by the ISR only.
    pulses: AtomicU32,
    /// Value of `pulses` at the last volume clear.  Written by the main
    /// loop only.
    volume_base: AtomicU32,
}

impl Default for PulseCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            pulses: AtomicU32::new(0),
            volume_base: AtomicU32::new(0),
        }
    }

    /// Count one edge.  Called from interrupt context.
    pub fn on_edge(&self) {
        self.pulses.fetch_add(1, Ordering::Relaxed);
    }

    /// Edges since boot.
    pub fn pulse_count(&self) -> u32 {
        self.pulses.load(Ordering::Acquire)
    }

    /// Edges since the last [`clear_volume`](Self::clear_volume).
    pub fn volume_pulses(&self) -> u32 {
        self.tally().1
    }

    /// `(pulse_count, volume_pulses)` from a single load of the count.
    pub fn tally(&self) -> (u32, u32) {
        let pulses = self.pulse_count();
        let base = self.volume_base.load(Ordering::Relaxed);
        (pulses, pulses.wrapping_sub(base))
    }

    /// Snapshot-and-advance: returns the edges counted since `*previous`
    /// and stores the current count into it.  Wraparound is handled
    /// modularly.
    pub fn take_delta(&self, previous: &mut u32) -> u32 {
        let now = self.pulse_count();
        let delta = now.wrapping_sub(*previous);
        *previous = now;
        delta
    }

    /// Restart the volume tally from the current count.  The pulse count is
    /// left untouched; an edge racing the clear is counted in the new
    /// volume.
    pub fn clear_volume(&self) {
        let now = self.pulse_count();
        self.volume_base.store(now, Ordering::Relaxed);
    }

    /// Preload the pulse count (host simulation of a long-running counter).
    /// The volume restarts at the preloaded value.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_preload(&self, pulses: u32) {
        self.pulses.store(pulses, Ordering::Release);
        self.volume_base.store(pulses, Ordering::Relaxed);
    }
}

/// Counters shared with the GPIO ISRs.  `static` because ESP-IDF ISR
/// callbacks cannot capture state.
pub static FLOW_COUNTERS: [PulseCounter; FLOW_CHANNELS] = [PulseCounter::new(), PulseCounter::new()];

/// Called from the GPIO ISR on each falling edge of flow input `channel`.
/// Out-of-range channels are ignored.
pub fn flow_isr_handler(channel: usize) {
    if let Some(counter) = FLOW_COUNTERS.get(channel) {
        counter.on_edge();
    }
}

/// Run `f` with interrupts masked on this core, so no edge is counted
/// while it runs.  Uses the ISR-safe portMUX spinlock.
#[cfg(target_os = "espidf")]
fn with_edges_masked<R>(f: impl FnOnce() -> R) -> R {
    esp_idf_hal::interrupt::free(f)
}

#[cfg(not(target_os = "espidf"))]
fn with_edges_masked<R>(f: impl FnOnce() -> R) -> R {
    f()
}

// ---------------------------------------------------------------------------
// Rate estimation
// ---------------------------------------------------------------------------

/// Owns the previous-count snapshots and the last computed rates.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    previous: [u32; FLOW_CHANNELS],
    rates: [f64; FLOW_CHANNELS],
    calibration_divisor: f64,
}

impl RateEstimator {
    pub fn new(calibration_divisor: f64) -> Self {
        Self {
            previous: [0; FLOW_CHANNELS],
            rates: [0.0; FLOW_CHANNELS],
            calibration_divisor,
        }
    }

    /// Differentiate every counter against its previous snapshot.
    /// Returns the per-channel pulse deltas of this interval.
    ///
    /// Both channels are snapshotted with edges masked, so the two deltas
    /// cover the same interval.
    pub fn tick(&mut self, counters: &[PulseCounter; FLOW_CHANNELS]) -> [u32; FLOW_CHANNELS] {
        let previous = &mut self.previous;
        let deltas: [u32; FLOW_CHANNELS] = with_edges_masked(|| {
            core::array::from_fn(|ch| counters[ch].take_delta(&mut previous[ch]))
        });
        for (rate, &delta) in self.rates.iter_mut().zip(&deltas) {
            *rate = f64::from(delta) / self.calibration_divisor;
        }
        deltas
    }

    /// Last computed rate for `channel`, `None` past the last channel.
    pub fn rate(&self, channel: usize) -> Option<f64> {
        self.rates.get(channel).copied()
    }
}

// ---------------------------------------------------------------------------
// Flow meter
// ---------------------------------------------------------------------------

/// Current state of one flow channel as seen by the main loop.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowReading {
    /// Edges since boot (wrapping).
    pub pulse_count: u32,
    /// Rate computed at the last tick (L/min at 7.5 Hz per L/min).
    pub rate: f64,
    /// Volume since the last clear (litres).
    pub total_liters: f64,
}

/// Both flow channels: ISR counters plus the main-loop rate estimator.
pub struct FlowMeter {
    counters: &'static [PulseCounter; FLOW_CHANNELS],
    estimator: RateEstimator,
    liters_per_pulse: [f64; FLOW_CHANNELS],
}

impl FlowMeter {
    pub fn new(counters: &'static [PulseCounter; FLOW_CHANNELS], config: &LoggerConfig) -> Self {
        Self {
            counters,
            estimator: RateEstimator::new(config.flow_calibration_divisor),
            liters_per_pulse: config.liters_per_pulse,
        }
    }

    /// Recompute both rates.  Call once per sample interval.
    pub fn tick(&mut self) -> [u32; FLOW_CHANNELS] {
        self.estimator.tick(self.counters)
    }

    /// Current state of `channel`, `None` past the last channel.
    pub fn reading(&self, channel: usize) -> Option<FlowReading> {
        let counter = self.counters.get(channel)?;
        let (pulse_count, volume_pulses) = counter.tally();
        Some(FlowReading {
            pulse_count,
            rate: self.estimator.rate(channel)?,
            total_liters: f64::from(volume_pulses) * self.liters_per_pulse[channel],
        })
    }

    /// Both channels read with edges masked, so no edge lands between the
    /// two reads.
    pub fn readings(&self) -> [FlowReading; FLOW_CHANNELS] {
        with_edges_masked(|| {
            core::array::from_fn(|ch| self.reading(ch).unwrap_or_default())
        })
    }

    /// Zero both volume totals.  Pulse counts and rates are unaffected.
    pub fn clear_totals(&self) {
        for counter in self.counters {
            counter.clear_volume();
        }
    }
}
