use crate::audio_api::CvCommand;
use crate::core::conditioner::Scaler;

use super::voice::Voice;

pub struct Engine {
    voice: Voice,
    dac_to_volts: Scaler,
}

impl Engine {
    /// `dac_to_volts` undoes the pitch DAC scaling so the voice tracks the CV.
    pub fn new(sample_rate: f32, dac_to_volts: Scaler) -> Self {
        Self {
            voice: Voice::new(sample_rate),
            dac_to_volts,
        }
    }

    pub fn handle_cmd(&mut self, cmd: CvCommand) {
        match cmd {
            CvCommand::Pitch(code) => self.voice.set_volts(self.dac_to_volts.apply(code as f32)),
            CvCommand::Gate(high) => self.voice.set_gate(high),
        }
    }

    // mono render, copied to every channel of the interleaved buffer
    pub fn render_block(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels.max(1)) {
            let sample = self.voice.next_sample();
            frame.fill(sample);
        }
    }
}
