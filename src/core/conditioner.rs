// signal conditioning shared by every analog channel: affine scaling between
// ranges, saturation, and the per-channel exponential smoother

use std::fmt;

use serde::{Deserialize, Serialize};

/// A pair of endpoints. `start` may be greater than `end`; an inverted range
/// is how a backwards-wired potentiometer is described.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub start: f32,
    pub end: f32,
}

impl Range {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn inverted(self) -> Self {
        Self { start: self.end, end: self.start }
    }

    pub fn width(self) -> f32 {
        self.end - self.start
    }

    pub fn is_degenerate(self) -> bool {
        self.width() == 0.0 || !self.width().is_finite()
    }

    pub fn low(self) -> f32 {
        self.start.min(self.end)
    }

    pub fn high(self) -> f32 {
        self.start.max(self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConditionError {
    DegenerateRange(Range),
    ZeroPrecision,
}

impl fmt::Display for ConditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionError::DegenerateRange(r) => {
                write!(f, "cannot scale from zero-width range {}..{}", r.start, r.end)
            }
            ConditionError::ZeroPrecision => write!(f, "rounding precision must be non-zero"),
        }
    }
}

impl std::error::Error for ConditionError {}

pub fn scale(value: f32, from: Range, to: Range) -> Result<f32, ConditionError> {
    Ok(Scaler::new(from, to)?.apply(value))
}

// scale, then round to the nearest multiple of 1/precision
pub fn scale_with_precision(
    value: f32,
    from: Range,
    to: Range,
    precision: u32,
) -> Result<f32, ConditionError> {
    Scaler::new(from, to)?.apply_rounded(value, precision)
}

pub fn clamp(value: f32, range: Range) -> f32 {
    value.clamp(range.low(), range.high())
}

/// A validated from/to pair. Building one is the only fallible step, so the
/// tick handler can apply it without an error path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scaler {
    from: Range,
    to: Range,
}

impl Scaler {
    pub fn new(from: Range, to: Range) -> Result<Self, ConditionError> {
        if from.is_degenerate() {
            return Err(ConditionError::DegenerateRange(from));
        }
        Ok(Self { from, to })
    }

    pub fn to_range(&self) -> Range {
        self.to
    }

    pub fn apply(&self, value: f32) -> f32 {
        (value - self.from.start) * self.to.width() / self.from.width() + self.to.start
    }

    pub fn apply_rounded(&self, value: f32, precision: u32) -> Result<f32, ConditionError> {
        if precision == 0 {
            return Err(ConditionError::ZeroPrecision);
        }
        let p = precision as f32;
        Ok((self.apply(value) * p).round() / p)
    }

    pub fn reversed(&self) -> Result<Self, ConditionError> {
        Self::new(self.to, self.from)
    }
}

/// Exponential moving average for one analog channel.
#[derive(Clone, Copy, Debug)]
pub struct Smoother {
    factor: f32,
    value: f32,
}

impl Smoother {
    pub fn new(factor: f32, initial: f32) -> Self {
        Self { factor, value: initial }
    }

    pub fn next(&mut self, sample: f32) -> f32 {
        self.value = self.factor * sample + (1.0 - self.factor) * self.value;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}
