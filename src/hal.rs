// the seams between the sequencing core and whatever hardware (or host
// simulation) sits around it

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::shared::{DisplayState, Knob, StepId};

/// Raw potentiometer readings, in the configured analog input range.
pub trait AnalogInput {
    fn read(&mut self, knob: Knob) -> u16;
}

pub trait DigitalInput {
    fn is_pressed(&mut self, step: StepId) -> bool;
}

/// Pitch DAC and gate pin. Called from the tick context, so implementations
/// must return promptly and never block.
pub trait CvOutput: Send + Sync {
    fn write_pitch(&self, dac_value: u16);
    fn write_gate(&self, high: bool);
}

pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

pub trait PeriodicTimer {
    /// Start calling `callback` every `interval` until `detach`.
    fn attach(&mut self, interval: Duration, callback: TickCallback) -> Result<(), TimerError>;
    fn detach(&mut self);
}

pub trait DisplaySink {
    fn show(&mut self, state: &DisplayState) -> std::io::Result<()>;
}

#[derive(Debug)]
pub enum TimerError {
    InvalidInterval(Duration),
    AlreadyAttached,
    Spawn(std::io::Error),
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::InvalidInterval(d) => write!(f, "invalid tick interval {d:?}"),
            TimerError::AlreadyAttached => write!(f, "timer is already running"),
            TimerError::Spawn(e) => write!(f, "could not start timer thread: {e}"),
        }
    }
}

impl std::error::Error for TimerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TimerError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TimerError {
    fn from(e: std::io::Error) -> Self {
        Self::Spawn(e)
    }
}
