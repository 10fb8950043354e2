// Whole-instrument scenarios: the control loop and the tick handler wired
// together the way main wires them, with the hardware faked out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cvseq::audio::SilentOutput;
use cvseq::hal::{AnalogInput, CvOutput, DigitalInput, PeriodicTimer, TickCallback, TimerError};
use cvseq::middle::Middle;
use cvseq::pipeline::config::Config;
use cvseq::shared::{Knob, StepId, NUM_STEPS};
use cvseq::timer::ThreadTimer;

#[derive(Default)]
struct Panel {
    pressed: [bool; NUM_STEPS],
    tuning: u16,
    tempo: u16,
    gate: u16,
}

impl AnalogInput for Panel {
    fn read(&mut self, knob: Knob) -> u16 {
        match knob {
            Knob::Tuning => self.tuning,
            Knob::Tempo => self.tempo,
            Knob::GateWidth => self.gate,
        }
    }
}

impl DigitalInput for Panel {
    fn is_pressed(&mut self, step: StepId) -> bool {
        self.pressed[step.0 as usize]
    }
}

#[derive(Default)]
struct ManualTimer {
    interval: Option<Duration>,
    callback: Option<TickCallback>,
    attaches: usize,
}

impl PeriodicTimer for ManualTimer {
    fn attach(&mut self, interval: Duration, callback: TickCallback) -> Result<(), TimerError> {
        if self.callback.is_some() {
            return Err(TimerError::AlreadyAttached);
        }
        self.interval = Some(interval);
        self.callback = Some(callback);
        self.attaches += 1;
        Ok(())
    }

    fn detach(&mut self) {
        self.interval = None;
        self.callback = None;
    }
}

struct Instrument {
    middle: Middle,
    output: Arc<SilentOutput>,
    panel: Panel,
    timer: ManualTimer,
    now: u64,
}

impl Instrument {
    fn boot() -> Self {
        let output = Arc::new(SilentOutput::default());
        let mut middle = Middle::new(&Config::default(), output.clone()).unwrap();
        let mut timer = ManualTimer::default();
        middle.start(&mut timer).unwrap();
        let panel = Panel {
            tuning: 1023,
            tempo: middle.tempo_reading().round() as u16,
            gate: 512,
            ..Panel::default()
        };
        Self { middle, output, panel, timer, now: 0 }
    }

    fn cycle(&mut self, ms: u64) {
        self.now += ms;
        self.middle
            .control_cycle(self.now, &mut self.panel, &mut self.timer)
            .unwrap();
    }

    fn tap(&mut self, step: usize) {
        self.panel.pressed[step] = true;
        self.cycle(10);
        self.panel.pressed[step] = false;
        self.cycle(40);
    }

    fn tick(&self) {
        let tick = self.timer.callback.as_ref().unwrap();
        tick();
    }

    // runs sub-ticks up to and including the next step boundary
    fn next_step(&self) -> usize {
        let clock = &self.middle.state().clock;
        loop {
            self.tick();
            if clock.sub_step() == 0 {
                return clock.sounding_step();
            }
        }
    }
}

#[test]
fn test_boots_at_120_bpm() {
    let inst = Instrument::boot();
    assert_eq!(inst.middle.bpm(), 120.0);
    assert_eq!(inst.timer.interval, Some(Duration::from_micros(31_250)));
}

#[test]
fn test_half_width_gate_follows_sub_steps() {
    let inst = Instrument::boot();
    for i in 0..48 {
        inst.tick();
        assert_eq!(inst.output.gate(), i % 16 < 8, "sub-tick {i}");
    }
}

#[test]
fn test_pitch_written_at_each_boundary() {
    let inst = Instrument::boot();
    assert_eq!(inst.next_step(), 1);
    assert_eq!(inst.output.pitch(), 0);
    assert_eq!(inst.next_step(), 2);
    assert_eq!(inst.output.pitch(), 819); // 1 V of 5 V on a 12-bit DAC
    assert_eq!(inst.next_step(), 3);
    assert_eq!(inst.output.pitch(), 1638);
}

#[test]
fn test_full_cycle_visits_all_nine_steps() {
    let inst = Instrument::boot();
    let visited: Vec<usize> = (0..18).map(|_| inst.next_step()).collect();
    assert_eq!(visited, [1, 2, 3, 4, 5, 6, 7, 8, 9, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn test_double_tap_drops_last_step() {
    let mut inst = Instrument::boot();
    inst.tap(8);
    inst.tap(8);
    assert_eq!(inst.middle.state().steps.span(), 8);
    assert_eq!(inst.middle.display_state().span, 8);

    let visited: Vec<usize> = (0..16).map(|_| inst.next_step()).collect();
    assert_eq!(visited, [1, 2, 3, 4, 5, 6, 7, 8, 1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_muted_step_keeps_gate_low() {
    let mut inst = Instrument::boot();
    inst.tap(1);
    assert!(!inst.middle.state().steps.is_active(1));

    assert_eq!(inst.next_step(), 1);
    assert!(inst.output.gate());
    assert_eq!(inst.next_step(), 2);
    assert!(!inst.output.gate());
    assert_eq!(inst.output.pitch(), 0); // step 1's pitch still on the DAC
}

#[test]
fn test_held_step_is_previewed_and_retuned() {
    let mut inst = Instrument::boot();
    inst.panel.tuning = 0; // pot is wired backwards: top of the CV range
    inst.panel.pressed[5] = true;
    for _ in 0..7 {
        inst.cycle(100);
    }
    assert_eq!(inst.middle.state().held_step(), Some(5));

    assert_eq!(inst.next_step(), 6);
    assert_eq!(inst.output.pitch(), 4095);
    assert_eq!(inst.next_step(), 6);

    inst.panel.pressed[5] = false;
    inst.cycle(10);
    assert_eq!(inst.middle.state().held_step(), None);
    assert!(inst.middle.state().steps.is_active(5));
    assert!((inst.middle.state().steps.pitch(5) - 5.0).abs() < 1e-4);
}

#[test]
fn test_tempo_change_reattaches_timer() {
    let mut inst = Instrument::boot();
    assert_eq!(inst.timer.attaches, 1);
    inst.panel.tempo = 1023; // slowest
    for _ in 0..30 {
        inst.cycle(100);
    }
    assert!(inst.timer.attaches > 1);
    assert!(inst.middle.bpm() < 60.0);
    assert!(inst.timer.interval.unwrap() > Duration::from_millis(60));
}

#[derive(Default)]
struct CountingOutput {
    gates_opened: AtomicUsize,
}

impl CvOutput for CountingOutput {
    fn write_pitch(&self, _dac_value: u16) {}

    fn write_gate(&self, high: bool) {
        if high {
            self.gates_opened.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[test]
fn test_thread_timer_drives_the_clock() {
    let output = Arc::new(CountingOutput::default());
    let mut middle = Middle::new(&Config::default(), output.clone()).unwrap();
    let mut timer = ThreadTimer::new();
    middle.start(&mut timer).unwrap();
    std::thread::sleep(Duration::from_millis(200));
    timer.detach();

    assert!(output.gates_opened.load(Ordering::Relaxed) >= 1);
    assert_eq!(timer.interval(), None);
}
