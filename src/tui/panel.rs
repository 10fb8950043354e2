use std::time::{Duration, Instant};

use crate::hal::{AnalogInput, DigitalInput};
use crate::shared::{InputEvent, Knob, StepId, NUM_STEPS};

// terminals that never send key releases get a synthetic one after this long
// without a press or autorepeat for the key
const RELEASE_TIMEOUT: Duration = Duration::from_millis(650);

#[derive(Clone, Copy, Debug, Default)]
struct KeyButton {
    pressed: bool,
    last_seen: Option<Instant>,
}

/// What the TUI needs to draw the controls themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Controls {
    pub pressed: [bool; NUM_STEPS],
    pub tuning: u16,
    pub tempo: u16,
    pub gate: u16,
    pub analog_max: u16,
}

// keyboard-played stand-in for the pots and the button expander
#[derive(Clone, Debug)]
pub struct FrontPanel {
    buttons: [KeyButton; NUM_STEPS],
    tuning: u16,
    tempo: u16,
    gate: u16,
    analog_max: u16,
    releases_reported: bool,
}

impl FrontPanel {
    pub fn new(analog_max: u16, tempo: u16) -> Self {
        let mid = analog_max / 2;
        Self {
            buttons: [KeyButton::default(); NUM_STEPS],
            tuning: mid,
            tempo: tempo.min(analog_max),
            gate: mid,
            analog_max,
            releases_reported: false,
        }
    }

    pub fn apply(&mut self, event: &InputEvent, now: Instant) {
        match *event {
            InputEvent::StepDown(StepId(i)) => {
                if let Some(b) = self.buttons.get_mut(i as usize) {
                    b.pressed = true;
                    b.last_seen = Some(now);
                }
            }
            InputEvent::StepUp(StepId(i)) => {
                self.releases_reported = true;
                if let Some(b) = self.buttons.get_mut(i as usize) {
                    b.pressed = false;
                }
            }
            InputEvent::KnobTurn(knob, delta) => {
                let max = self.analog_max as i32;
                let value = self.knob_mut(knob);
                *value = (*value as i32 + delta).clamp(0, max) as u16;
            }
            InputEvent::Quit => {}
        }
    }

    /// Let go of keys the terminal will never report releasing.
    pub fn expire(&mut self, now: Instant) {
        if self.releases_reported {
            return;
        }
        for b in &mut self.buttons {
            let stale = b
                .last_seen
                .is_some_and(|seen| now.duration_since(seen) > RELEASE_TIMEOUT);
            if b.pressed && stale {
                b.pressed = false;
            }
        }
    }

    pub fn controls(&self) -> Controls {
        Controls {
            pressed: std::array::from_fn(|i| self.buttons[i].pressed),
            tuning: self.tuning,
            tempo: self.tempo,
            gate: self.gate,
            analog_max: self.analog_max,
        }
    }

    fn knob_mut(&mut self, knob: Knob) -> &mut u16 {
        match knob {
            Knob::Tuning => &mut self.tuning,
            Knob::Tempo => &mut self.tempo,
            Knob::GateWidth => &mut self.gate,
        }
    }
}

impl AnalogInput for FrontPanel {
    fn read(&mut self, knob: Knob) -> u16 {
        *self.knob_mut(knob)
    }
}

impl DigitalInput for FrontPanel {
    fn is_pressed(&mut self, step: StepId) -> bool {
        self.buttons
            .get(step.0 as usize)
            .is_some_and(|b| b.pressed)
    }
}
