// a single 1 V/octave oscillator with a gate-driven amplitude, standing in
// for whatever synth voice the CV and gate jacks would be patched into

use std::f32::consts::TAU;

// 0 V plays C2 so the bottom of the range is still audible on laptop speakers
pub const BASE_HZ: f32 = 65.406;
const LEVEL: f32 = 0.2;
const SLEW_MS: f32 = 3.0; // keeps gate edges from clicking

pub fn volts_to_hz(volts: f32) -> f32 {
    BASE_HZ * 2.0_f32.powf(volts)
}

#[derive(Clone, Debug)]
pub struct Voice {
    phase: f32,
    phase_inc: f32,
    amp: f32,
    gate: bool,
    slew_step: f32,
    sample_rate: f32,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        let mut voice = Self {
            phase: 0.0,
            phase_inc: 0.0,
            amp: 0.0,
            gate: false,
            slew_step: LEVEL / (SLEW_MS * 0.001 * sample_rate).max(1.0),
            sample_rate,
        };
        voice.set_volts(0.0);
        voice
    }

    pub fn set_volts(&mut self, volts: f32) {
        self.phase_inc = TAU * volts_to_hz(volts) / self.sample_rate;
    }

    pub fn set_gate(&mut self, high: bool) {
        self.gate = high;
    }

    pub fn is_sounding(&self) -> bool {
        self.amp > 0.0
    }

    pub fn next_sample(&mut self) -> f32 {
        let target = if self.gate { LEVEL } else { 0.0 };
        if self.amp < target {
            self.amp = (self.amp + self.slew_step).min(target);
        } else if self.amp > target {
            self.amp = (self.amp - self.slew_step).max(target);
        }

        // a touch of second harmonic so it reads as a note rather than a test tone
        let out = self.amp * (self.phase.sin() + 0.3 * (2.0 * self.phase).sin());
        self.phase += self.phase_inc;
        if self.phase > TAU {
            self.phase -= TAU;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volt_per_octave() {
        assert!((volts_to_hz(0.0) - BASE_HZ).abs() < 1e-3);
        assert!((volts_to_hz(1.0) - 2.0 * BASE_HZ).abs() < 1e-3);
        assert!((volts_to_hz(3.0) - 8.0 * BASE_HZ).abs() < 1e-2);
    }

    #[test]
    fn test_gate_opens_and_closes() {
        let mut v = Voice::new(48_000.0);
        assert_eq!(v.next_sample(), 0.0);
        v.set_gate(true);
        let peak = (0..4_800).map(|_| v.next_sample().abs()).fold(0.0, f32::max);
        assert!(peak > 0.1);
        v.set_gate(false);
        for _ in 0..4_800 {
            v.next_sample();
        }
        assert!(!v.is_sounding());
    }
}
