// The control loop. One `control_cycle` reads every input, conditions the pots,
// resolves button gestures into step store edits, retunes the clock, and
// rebuilds the display. The tick handler runs separately off the timer and only
// ever meets this code through `SequencerState`.

use std::sync::Arc;

use crate::core::buttons::{ButtonMachine, EditEvent};
use crate::core::clock::SequencerClock;
use crate::core::conditioner::{clamp, Range, Scaler, Smoother};
use crate::core::display;
use crate::core::pitch_table::PitchTable;
use crate::core::tempo::TempoController;
use crate::core::SequencerState;
use crate::hal::{AnalogInput, CvOutput, DigitalInput, PeriodicTimer, TickCallback, TimerError};
use crate::pipeline::config::{Config, ConfigError};
use crate::shared::{DisplayState, Knob, StepId, NUM_STEPS};

const DIAGNOSTIC_PERIOD_MS: u64 = 1_000;

pub struct Middle {
    state: Arc<SequencerState>,
    table: PitchTable,
    buttons: ButtonMachine,
    tempo: TempoController,
    tick: TickCallback,

    analog_range: Range,
    cv_range: Range,
    tuning: Scaler,
    gate: Scaler,
    dac: Scaler,
    tempo_smoother: Smoother,
    gate_smoother: Smoother,

    tuning_cv: f32,
    display: DisplayState,
    last_diagnostic_ms: Option<u64>,
}

impl Middle {
    pub fn new(config: &Config, output: Arc<dyn CvOutput>) -> Result<Self, ConfigError> {
        config.validate()?;

        let state = Arc::new(SequencerState::new(config.gate_resolution));
        let dac = config.dac_scaler()?;
        let clock = SequencerClock::new(state.clone(), output, dac);
        let tick: TickCallback = Arc::new(move || {
            clock.tick();
        });

        let tempo = TempoController::new(config)?;
        let initial_width = state.gate_width();

        Ok(Self {
            table: PitchTable::new(),
            buttons: ButtonMachine::new(config.hold_ms, config.double_tap_ms),
            tempo_smoother: Smoother::new(config.smoothing_factor, tempo.seed()),
            gate_smoother: Smoother::new(config.smoothing_factor, initial_width),
            tempo,
            tick,
            analog_range: config.analog_range,
            cv_range: config.cv_range,
            tuning: config.tuning_scaler()?,
            gate: config.gate_scaler()?,
            dac,
            tuning_cv: 0.0,
            display: DisplayState::default(),
            last_diagnostic_ms: None,
            state,
        })
    }

    pub fn state(&self) -> &Arc<SequencerState> {
        &self.state
    }

    /// The tick handler, for whoever drives the clock.
    pub fn tick_callback(&self) -> TickCallback {
        self.tick.clone()
    }

    pub fn bpm(&self) -> f32 {
        self.tempo.bpm()
    }

    /// Where the smoothed tempo pot currently sits, in analog units.
    pub fn tempo_reading(&self) -> f32 {
        self.tempo_smoother.value()
    }

    pub fn display_state(&self) -> &DisplayState {
        &self.display
    }

    /// Attach the tick handler at the initial tempo.
    pub fn start(&mut self, timer: &mut dyn PeriodicTimer) -> Result<(), TimerError> {
        log::info!(
            "clock starting at {:.1} bpm, tick every {:?}",
            self.tempo.bpm(),
            self.tempo.interval()
        );
        self.tempo.start(timer, self.tick.clone())?;
        self.display = display::build(&self.state, &self.table, self.tempo.bpm());
        Ok(())
    }

    /// One pass of the main loop. `panel` is the pots and the step buttons.
    pub fn control_cycle<P: AnalogInput + DigitalInput>(
        &mut self,
        now: u64,
        panel: &mut P,
        timer: &mut dyn PeriodicTimer,
    ) -> Result<&DisplayState, TimerError> {
        let levels: [bool; NUM_STEPS] =
            std::array::from_fn(|i| panel.is_pressed(StepId(i as u8)));
        self.buttons.update(levels, now);

        self.read_pots(panel);

        self.tempo
            .update_timer(self.tempo_smoother.value(), now, timer, &self.tick)?;

        self.apply_buttons(now);

        self.display = display::build(&self.state, &self.table, self.tempo.bpm());
        self.log_diagnostics(now);
        Ok(&self.display)
    }

    fn read_pots(&mut self, analog: &mut dyn AnalogInput) {
        let tuning = clamp(analog.read(Knob::Tuning) as f32, self.analog_range);
        self.tuning_cv = clamp(self.tuning.apply(tuning), self.cv_range);

        let tempo = clamp(analog.read(Knob::Tempo) as f32, self.analog_range);
        self.tempo_smoother.next(tempo);

        let raw_gate = clamp(analog.read(Knob::GateWidth) as f32, self.analog_range);
        // whole sub-ticks before smoothing, matching the pot's detents
        let width = self.gate.apply(raw_gate).round();
        let width = clamp(width, self.gate.to_range());
        self.state.set_gate_width(self.gate_smoother.next(width));
    }

    fn apply_buttons(&mut self, now: u64) {
        let steps = &self.state.steps;
        let event = self.buttons.classify(now);

        let held = match event {
            Some(EditEvent::Edit(step)) => Some(step),
            _ => None,
        };
        if held != self.state.held_step() {
            match held {
                Some(step) => log::debug!("step {} held, editing pitch", step + 1),
                None => log::debug!("edit released"),
            }
        }
        self.state.set_held_step(held);

        match event {
            Some(EditEvent::Edit(step)) => steps.set_pitch(step, self.tuning_cv),
            Some(EditEvent::ToggleActive(step)) => {
                let active = steps.toggle_active(step);
                log::info!("step {} {}", step + 1, if active { "on" } else { "muted" });
            }
            Some(EditEvent::ToggleEnabled(step)) => {
                let span = steps.toggle_last_enabled();
                log::info!("step {} double tapped, sequence length {}", step + 1, span);
            }
            None => {}
        }
    }

    fn log_diagnostics(&mut self, now: u64) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let sounding = self.display.sounding_step.saturating_sub(1);
        let cv = self.state.steps.pitch(sounding);
        let line = format!(
            "t={now} bpm={:.1} step={} cv={cv:.3} dac={:.0} tune={:.3} gate_width={:.2} buttons={:?}",
            self.tempo.bpm(),
            sounding + 1,
            self.dac.apply(cv),
            self.tuning_cv,
            self.state.gate_width(),
            self.buttons.levels().map(u8::from),
        );
        log::trace!("{line}");

        let due = self
            .last_diagnostic_ms
            .is_none_or(|last| now.saturating_sub(last) >= DIAGNOSTIC_PERIOD_MS);
        if due {
            self.last_diagnostic_ms = Some(now);
            log::debug!("{line}");
        }
    }
}
