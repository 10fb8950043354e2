// turns the smoothed tempo pot into a tick interval. Rate limited, and a new
// reading has to clear a hysteresis band around a 3-sample moving average
// before the timer is touched, so pot jitter never retriggers the clock.

use std::time::Duration;

use crate::core::conditioner::Scaler;
use crate::hal::{PeriodicTimer, TickCallback, TimerError};
use crate::pipeline::config::{Config, ConfigError};

const WINDOW: usize = 3;

/// Milliseconds between sub-ticks for `bpm` quarter notes split `resolution` ways.
pub fn tick_interval_ms(bpm: f32, resolution: u32) -> f64 {
    1000.0 / (bpm as f64 / 60.0) / resolution as f64
}

pub fn tick_interval(bpm: f32, resolution: u32) -> Duration {
    Duration::from_secs_f64(tick_interval_ms(bpm, resolution) / 1000.0)
}

#[derive(Clone, Debug)]
pub struct TempoController {
    window: [f32; WINDOW], // analog units, oldest first
    last_update_ms: Option<u64>,
    debounce_ms: u64,
    hysteresis: f32,
    scaler: Scaler, // analog -> bpm
    bpm: f32,
    resolution: u32,
}

impl TempoController {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let scaler = config.tempo_scaler()?;
        let seed = scaler.reversed()?.apply(config.initial_bpm);
        Ok(Self {
            window: [seed; WINDOW],
            last_update_ms: None,
            debounce_ms: config.tempo_debounce_ms,
            hysteresis: config.tempo_hysteresis,
            scaler,
            bpm: config.initial_bpm,
            resolution: config.gate_resolution,
        })
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// The analog reading the current window is centred on at startup.
    pub fn seed(&self) -> f32 {
        self.window[WINDOW - 1]
    }

    pub fn interval(&self) -> Duration {
        tick_interval(self.bpm, self.resolution)
    }

    pub fn moving_average(&self) -> f32 {
        self.window.iter().sum::<f32>() / WINDOW as f32
    }

    /// Feed one smoothed reading (analog units). Returns the new bpm when the
    /// reading is accepted as a tempo change.
    pub fn update(&mut self, sample: f32, now: u64) -> Option<f32> {
        if let Some(last) = self.last_update_ms {
            if now.saturating_sub(last) < self.debounce_ms {
                return None;
            }
        }
        self.last_update_ms = Some(now);

        self.window.rotate_left(1);
        self.window[WINDOW - 1] = sample;

        if (sample - self.moving_average()).abs() <= self.hysteresis {
            return None;
        }

        let range = self.scaler.to_range();
        self.bpm = self.scaler.apply(sample).clamp(range.low(), range.high());
        Some(self.bpm)
    }

    /// First attach at startup with the initial tempo.
    pub fn start(
        &self,
        timer: &mut dyn PeriodicTimer,
        callback: TickCallback,
    ) -> Result<(), TimerError> {
        timer.attach(self.interval(), callback)
    }

    /// `update`, and on an accepted change swap the timer over to the new
    /// interval. A failed reattach leaves the clock stopped and is fatal.
    pub fn update_timer(
        &mut self,
        sample: f32,
        now: u64,
        timer: &mut dyn PeriodicTimer,
        callback: &TickCallback,
    ) -> Result<Option<f32>, TimerError> {
        let Some(bpm) = self.update(sample, now) else {
            return Ok(None);
        };
        let interval = self.interval();
        log::debug!("tempo -> {bpm:.1} bpm, tick every {interval:?}");
        timer.detach();
        timer.attach(interval, callback.clone())?;
        Ok(Some(bpm))
    }
}
