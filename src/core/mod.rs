pub mod buttons;
pub mod clock;
pub mod conditioner;
pub mod display;
pub mod pitch_table;
pub mod steps;
pub mod tempo;

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use clock::ClockState;
use steps::StepStore;

const NO_STEP: usize = usize::MAX;

/// Everything the tick handler and the control loop both touch.
///
/// One writer per field: the tick handler owns `clock`, the control loop owns
/// `steps`, `gate_width` and `held_step`. All access is `Relaxed`; a reader may
/// see one field a cycle ahead of another, which the sequencer tolerates.
#[derive(Debug)]
pub struct SequencerState {
    pub steps: StepStore,
    pub clock: ClockState,
    gate_width: AtomicU32, // f32 bits, sub-ticks
    held_step: AtomicUsize,
    resolution: u32,
}

impl SequencerState {
    pub fn new(resolution: u32) -> Self {
        Self {
            steps: StepStore::new(),
            clock: ClockState::new(resolution),
            gate_width: AtomicU32::new((resolution as f32 / 2.0).to_bits()),
            held_step: AtomicUsize::new(NO_STEP),
            resolution,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn gate_width(&self) -> f32 {
        f32::from_bits(self.gate_width.load(Ordering::Relaxed))
    }

    pub fn set_gate_width(&self, width: f32) {
        self.gate_width.store(width.to_bits(), Ordering::Relaxed);
    }

    /// 0-based index of the step in edit mode, if any
    pub fn held_step(&self) -> Option<usize> {
        match self.held_step.load(Ordering::Relaxed) {
            NO_STEP => None,
            i => Some(i),
        }
    }

    pub fn set_held_step(&self, step: Option<usize>) {
        self.held_step
            .store(step.unwrap_or(NO_STEP), Ordering::Relaxed);
    }
}
