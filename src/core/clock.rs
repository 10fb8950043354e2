// the tick handler. Each step period is split into `resolution` sub-ticks so
// the gate can close part way through a step without a second timer.
//
// Runs in the timer context: no locks, no allocation, no timer reprogramming.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::conditioner::Scaler;
use crate::core::SequencerState;
use crate::hal::CvOutput;

#[derive(Debug)]
pub struct ClockState {
    sub_step: AtomicU32,
    active_step: AtomicUsize,   // 1-based cursor, next step to sound
    sounding_step: AtomicUsize, // 1-based, last step that sounded
    gate: AtomicBool,
    blink: AtomicBool,
}

impl ClockState {
    // sub_step starts on the last sub-tick so the first tick is a step boundary
    pub fn new(resolution: u32) -> Self {
        Self {
            sub_step: AtomicU32::new(resolution.saturating_sub(1)),
            active_step: AtomicUsize::new(1),
            sounding_step: AtomicUsize::new(1),
            gate: AtomicBool::new(false),
            blink: AtomicBool::new(false),
        }
    }

    pub fn sub_step(&self) -> u32 {
        self.sub_step.load(Ordering::Relaxed)
    }

    pub fn active_step(&self) -> usize {
        self.active_step.load(Ordering::Relaxed)
    }

    pub fn sounding_step(&self) -> usize {
        self.sounding_step.load(Ordering::Relaxed)
    }

    pub fn gate(&self) -> bool {
        self.gate.load(Ordering::Relaxed)
    }

    pub fn blink(&self) -> bool {
        self.blink.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickEvent {
    SubStep { sub_step: u32, gate: bool },
    Boundary { step: usize, sounded: bool, dac_value: Option<u16> },
}

pub struct SequencerClock {
    state: Arc<SequencerState>,
    output: Arc<dyn CvOutput>,
    dac: Scaler,
}

impl SequencerClock {
    /// `dac` maps a step's control voltage onto the pitch DAC's codes.
    pub fn new(state: Arc<SequencerState>, output: Arc<dyn CvOutput>, dac: Scaler) -> Self {
        Self { state, output, dac }
    }

    pub fn state(&self) -> &Arc<SequencerState> {
        &self.state
    }

    pub fn tick(&self) -> TickEvent {
        let clock = &self.state.clock;
        let resolution = self.state.resolution();

        let sub_step = (clock.sub_step() + 1) % resolution.max(1);
        clock.sub_step.store(sub_step, Ordering::Relaxed);

        // wider gate -> later cutoff; a full-width gate never closes mid step
        let r = resolution as f32;
        let cutoff = r - (r - self.state.gate_width()).abs();
        if sub_step as f32 >= cutoff {
            self.set_gate(false);
        }

        if sub_step != 0 {
            return TickEvent::SubStep { sub_step, gate: clock.gate() };
        }

        clock.blink.fetch_xor(true, Ordering::Relaxed);

        let span = self.state.steps.span();
        let mut cursor = clock.active_step();
        if cursor == 0 || cursor > span {
            cursor = 1;
        }

        // a held step is previewed in place of the cursor
        let step = self.state.held_step().map_or(cursor, |held| held + 1);
        clock.sounding_step.store(step, Ordering::Relaxed);

        let index = step - 1;
        let sounded = self.state.steps.is_active(index);
        let dac_value = if sounded {
            let code = self.dac_code(self.state.steps.pitch(index));
            self.output.write_pitch(code);
            self.set_gate(true);
            Some(code)
        } else {
            self.set_gate(false);
            None
        };

        let next = if cursor >= span { 1 } else { cursor + 1 };
        clock.active_step.store(next, Ordering::Relaxed);

        TickEvent::Boundary { step, sounded, dac_value }
    }

    fn dac_code(&self, volts: f32) -> u16 {
        let to = self.dac.to_range();
        self.dac
            .apply(volts)
            .clamp(to.low(), to.high())
            .round() as u16
    }

    fn set_gate(&self, high: bool) {
        let was = self.state.clock.gate.swap(high, Ordering::Relaxed);
        if was != high {
            self.output.write_gate(high);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::conditioner::Range;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct RecordingOutput {
        pub pitches: Mutex<Vec<u16>>,
        pub gates: Mutex<Vec<bool>>,
    }

    impl CvOutput for RecordingOutput {
        fn write_pitch(&self, dac_value: u16) {
            self.pitches.lock().unwrap().push(dac_value);
        }

        fn write_gate(&self, high: bool) {
            self.gates.lock().unwrap().push(high);
        }
    }

    fn clock_with(resolution: u32, gate_width: f32) -> (SequencerClock, Arc<RecordingOutput>) {
        let state = Arc::new(SequencerState::new(resolution));
        state.set_gate_width(gate_width);
        let output = Arc::new(RecordingOutput::default());
        let dac = Scaler::new(Range::new(0.0, 5.0), Range::new(0.0, 4095.0)).unwrap();
        (SequencerClock::new(state, output.clone(), dac), output)
    }

    #[test]
    fn test_first_tick_is_boundary() {
        let (clock, output) = clock_with(16, 8.0);
        assert_eq!(
            clock.tick(),
            TickEvent::Boundary { step: 1, sounded: true, dac_value: Some(0) }
        );
        assert_eq!(*output.gates.lock().unwrap(), vec![true]);
    }

    #[test]
    fn test_half_width_gate_timing() {
        let (clock, _) = clock_with(16, 8.0);
        let mut levels = Vec::new();
        for _ in 0..32 {
            clock.tick();
            levels.push(clock.state().clock.gate());
        }
        for (i, high) in levels.iter().enumerate() {
            assert_eq!(*high, i % 16 < 8, "sub-tick {i}");
        }
    }

    #[test]
    fn test_full_width_gate_stays_open() {
        let (clock, output) = clock_with(16, 16.0);
        for _ in 0..48 {
            clock.tick();
            assert!(clock.state().clock.gate());
        }
        assert_eq!(*output.gates.lock().unwrap(), vec![true]);
    }

    #[test]
    fn test_inactive_step_keeps_gate_low() {
        let (clock, output) = clock_with(16, 8.0);
        clock.state().steps.toggle_active(0);
        assert_eq!(
            clock.tick(),
            TickEvent::Boundary { step: 1, sounded: false, dac_value: None }
        );
        assert!(!clock.state().clock.gate());
        assert!(output.pitches.lock().unwrap().is_empty());
    }

    fn visited(clock: &SequencerClock, boundaries: usize) -> Vec<usize> {
        let mut steps = Vec::new();
        while steps.len() < boundaries {
            if let TickEvent::Boundary { step, .. } = clock.tick() {
                steps.push(step);
            }
        }
        steps
    }

    #[test]
    fn test_cursor_visits_full_span() {
        let (clock, _) = clock_with(4, 2.0);
        assert_eq!(visited(&clock, 11), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 1, 2]);
    }

    #[test]
    fn test_cursor_skips_excluded_last_step() {
        let (clock, _) = clock_with(4, 2.0);
        clock.state().steps.toggle_last_enabled();
        assert_eq!(visited(&clock, 10), vec![1, 2, 3, 4, 5, 6, 7, 8, 1, 2]);
    }

    #[test]
    fn test_excluding_while_cursor_on_last_step_wraps() {
        let (clock, _) = clock_with(4, 2.0);
        assert_eq!(visited(&clock, 8).last(), Some(&8));
        // cursor now points at 9
        clock.state().steps.toggle_last_enabled();
        assert_eq!(visited(&clock, 2), vec![1, 2]);
    }

    #[test]
    fn test_held_step_is_previewed() {
        let (clock, output) = clock_with(4, 2.0);
        clock.state().steps.set_pitch(6, 2.5);
        clock.state().set_held_step(Some(6));
        let steps = visited(&clock, 3);
        assert_eq!(steps, vec![7, 7, 7]);
        assert!(output.pitches.lock().unwrap().iter().all(|&p| p == 2048));
        // the cursor keeps moving underneath
        assert_eq!(clock.state().clock.active_step(), 4);
    }

    #[test]
    fn test_blink_toggles_on_each_boundary() {
        let (clock, _) = clock_with(4, 2.0);
        clock.tick();
        assert!(clock.state().clock.blink());
        for _ in 0..4 {
            clock.tick();
        }
        assert!(!clock.state().clock.blink());
    }
}
