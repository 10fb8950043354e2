// every tunable of the instrument in one serde struct; missing keys in a
// config file fall back to the values the hardware shipped with

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::conditioner::{ConditionError, Range, Scaler};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gate_resolution: u32, // sub-ticks per step, ideally divisible by 4
    pub tempo_range: Range,   // bpm at analog min -> bpm at analog max
    pub initial_bpm: f32,
    pub cv_range: Range,
    pub analog_range: Range,
    pub tuning_range: Range, // tuning pot is wired backwards too
    pub dac_range: Range,
    pub hold_ms: u64,
    pub double_tap_ms: u64,
    pub tempo_debounce_ms: u64,
    pub tempo_hysteresis: f32, // analog units
    pub smoothing_factor: f32,
    pub control_period_ms: u64,
}

pub const ANALOG_HIGH: f32 = 1023.0;
pub const DAC_HIGH: f32 = 4095.0;

impl Default for Config {
    fn default() -> Self {
        Self {
            gate_resolution: 16,
            tempo_range: Range::new(600.0, 50.0),
            initial_bpm: 120.0,
            cv_range: Range::new(0.0, 5.0),
            analog_range: Range::new(0.0, ANALOG_HIGH),
            tuning_range: Range::new(ANALOG_HIGH, 0.0),
            dac_range: Range::new(0.0, DAC_HIGH),
            hold_ms: 500,
            double_tap_ms: 500,
            tempo_debounce_ms: 100,
            tempo_hysteresis: 2.0,
            smoothing_factor: 0.2,
            control_period_ms: 10,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gate_resolution == 0 {
            return Err(ConfigError::ZeroGateResolution);
        }
        if self.gate_resolution % 4 != 0 {
            log::warn!(
                "gate resolution {} is not divisible by 4, gate widths will not line up with quarter steps",
                self.gate_resolution
            );
        }
        for (name, range) in [
            ("tempo_range", self.tempo_range),
            ("cv_range", self.cv_range),
            ("analog_range", self.analog_range),
            ("tuning_range", self.tuning_range),
            ("dac_range", self.dac_range),
        ] {
            if range.is_degenerate() {
                return Err(ConfigError::DegenerateRange { name, range });
            }
        }
        if self.tempo_range.low() <= 0.0 {
            return Err(ConfigError::NonPositiveTempo(self.tempo_range.low()));
        }
        if self.initial_bpm.is_nan() || self.initial_bpm <= 0.0 {
            return Err(ConfigError::NonPositiveTempo(self.initial_bpm));
        }
        if self.initial_bpm < self.tempo_range.low() || self.initial_bpm > self.tempo_range.high() {
            return Err(ConfigError::InitialBpmOutOfRange {
                bpm: self.initial_bpm,
                range: self.tempo_range,
            });
        }
        if !(0.0..=1.0).contains(&self.smoothing_factor) || self.smoothing_factor == 0.0 {
            return Err(ConfigError::SmoothingFactor(self.smoothing_factor));
        }
        if self.dac_range.low() < 0.0 || self.dac_range.high() > u16::MAX as f32 {
            return Err(ConfigError::DacRange(self.dac_range));
        }
        Ok(())
    }

    /// Analog reading -> bpm
    pub fn tempo_scaler(&self) -> Result<Scaler, ConditionError> {
        Scaler::new(self.analog_range, self.tempo_range)
    }

    /// Gate width in sub-ticks, widest with the pot at the bottom of its travel
    pub fn gate_range(&self) -> Range {
        Range::new(self.gate_resolution as f32, 0.0)
    }

    /// Analog reading -> gate width in sub-ticks
    pub fn gate_scaler(&self) -> Result<Scaler, ConditionError> {
        Scaler::new(self.analog_range, self.gate_range())
    }

    /// Analog reading -> control voltage, through the inverted tuning range
    pub fn tuning_scaler(&self) -> Result<Scaler, ConditionError> {
        Scaler::new(self.tuning_range, self.cv_range)
    }

    /// Control voltage -> DAC code
    pub fn dac_scaler(&self) -> Result<Scaler, ConditionError> {
        Scaler::new(self.cv_range, self.dac_range)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ZeroGateResolution,
    DegenerateRange { name: &'static str, range: Range },
    NonPositiveTempo(f32),
    InitialBpmOutOfRange { bpm: f32, range: Range },
    SmoothingFactor(f32),
    DacRange(Range),
    Condition(ConditionError),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroGateResolution => write!(f, "gate_resolution must be at least 1"),
            ConfigError::DegenerateRange { name, range } => {
                write!(f, "{name} has zero width ({}..{})", range.start, range.end)
            }
            ConfigError::NonPositiveTempo(bpm) => write!(f, "tempo must be positive, got {bpm}"),
            ConfigError::InitialBpmOutOfRange { bpm, range } => write!(
                f,
                "initial_bpm {bpm} is outside tempo_range {}..{}",
                range.start, range.end
            ),
            ConfigError::SmoothingFactor(k) => {
                write!(f, "smoothing_factor must be in (0, 1], got {k}")
            }
            ConfigError::DacRange(r) => {
                write!(f, "dac_range {}..{} does not fit a 16-bit DAC", r.start, r.end)
            }
            ConfigError::Condition(e) => write!(f, "{e}"),
            ConfigError::Io(e) => write!(f, "config file: {e}"),
            ConfigError::Json(e) => write!(f, "config file is not valid JSON: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Condition(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<ConditionError> for ConfigError {
    fn from(e: ConditionError) -> Self {
        Self::Condition(e)
    }
}
