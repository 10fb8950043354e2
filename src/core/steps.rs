// per-step record shared between the control loop (sole writer) and the tick
// handler (reader); every field is its own atomic so neither side ever waits

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::shared::NUM_STEPS;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub pitch: f32, // control voltage, volts
    pub active: bool,
    pub enabled: bool,
}

#[derive(Debug)]
struct StepCell {
    pitch: AtomicU32, // f32 bits
    active: AtomicBool,
    enabled: AtomicBool,
}

impl StepCell {
    fn new(pitch: f32) -> Self {
        Self {
            pitch: AtomicU32::new(pitch.to_bits()),
            active: AtomicBool::new(true),
            enabled: AtomicBool::new(true),
        }
    }
}

#[derive(Debug)]
pub struct StepStore {
    cells: [StepCell; NUM_STEPS],
}

impl StepStore {
    // steps start active with pitches stepping up a volt at a time, wrapping every 6
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|i| StepCell::new((i % 6) as f32)),
        }
    }

    pub const fn last_index(&self) -> usize {
        NUM_STEPS - 1
    }

    pub fn get(&self, index: usize) -> Option<Step> {
        let cell = self.cells.get(index)?;
        Some(Step {
            pitch: f32::from_bits(cell.pitch.load(Ordering::Relaxed)),
            active: cell.active.load(Ordering::Relaxed),
            enabled: cell.enabled.load(Ordering::Relaxed),
        })
    }

    pub fn pitch(&self, index: usize) -> f32 {
        self.cells
            .get(index)
            .map(|c| f32::from_bits(c.pitch.load(Ordering::Relaxed)))
            .unwrap_or(0.0)
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.cells
            .get(index)
            .is_some_and(|c| c.active.load(Ordering::Relaxed))
    }

    pub fn set_pitch(&self, index: usize, pitch: f32) {
        if let Some(cell) = self.cells.get(index) {
            cell.pitch.store(pitch.to_bits(), Ordering::Relaxed);
        }
    }

    pub fn toggle_active(&self, index: usize) -> bool {
        match self.cells.get(index) {
            Some(cell) => !cell.active.fetch_xor(true, Ordering::Relaxed),
            None => false,
        }
    }

    /// Flip whether the last step plays in the rotation. Other indices cannot
    /// be excluded and are left alone. Returns the new span.
    pub fn toggle_last_enabled(&self) -> usize {
        self.cells[self.last_index()]
            .enabled
            .fetch_xor(true, Ordering::Relaxed);
        self.span()
    }

    /// Number of steps in the playing rotation, N or N-1.
    pub fn span(&self) -> usize {
        if self.cells[self.last_index()].enabled.load(Ordering::Relaxed) {
            NUM_STEPS
        } else {
            NUM_STEPS - 1
        }
    }
}

impl Default for StepStore {
    fn default() -> Self {
        Self::new()
    }
}
