use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use crate::audio_api::CvCommand;
use crate::core::conditioner::Scaler;
use crate::hal::CvOutput;

mod engine;
mod voice;

pub use voice::volts_to_hz;

use engine::Engine;

/// Owns the output stream; dropping it stops the sound.
pub struct AudioHandle {
    tx: Sender<CvCommand>,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    /// The CV/gate side of the handle, cheap to clone into the tick handler.
    pub fn output(&self) -> CvSender {
        CvSender { tx: self.tx.clone() }
    }
}

#[derive(Clone)]
pub struct CvSender {
    tx: Sender<CvCommand>,
}

impl CvOutput for CvSender {
    // a full queue drops the write rather than stall the clock
    fn write_pitch(&self, dac_value: u16) {
        let _ = self.tx.try_send(CvCommand::Pitch(dac_value));
    }

    fn write_gate(&self, high: bool) {
        let _ = self.tx.try_send(CvCommand::Gate(high));
    }
}

/// Output for running without a sound device; keeps the last values written.
#[derive(Debug, Default)]
pub struct SilentOutput {
    pitch: AtomicU16,
    gate: AtomicBool,
}

impl SilentOutput {
    pub fn pitch(&self) -> u16 {
        self.pitch.load(Ordering::Relaxed)
    }

    pub fn gate(&self) -> bool {
        self.gate.load(Ordering::Relaxed)
    }
}

impl CvOutput for SilentOutput {
    fn write_pitch(&self, dac_value: u16) {
        self.pitch.store(dac_value, Ordering::Relaxed);
    }

    fn write_gate(&self, high: bool) {
        self.gate.store(high, Ordering::Relaxed);
    }
}

/// Open the default output device. Without one there is nowhere to send the
/// CV, which the instrument treats as fatal.
pub fn start_audio(dac_to_volts: Scaler) -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<CvCommand>(1024);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate() as f32;
    let channels = config.channels() as usize;

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let engine = Engine::new(sample_rate, dac_to_volts);
            let output_stream = build_output_stream_f32(&device, &config.into(), engine, rx, channels)?;
            output_stream.play().context("failed to play output stream")?;
            log::info!("audio out: {channels} channels at {sample_rate} Hz");

            Ok(AudioHandle {
                tx,
                _output_stream: output_stream,
            })
        }
        _ => anyhow::bail!("unsupported sample format (only f32 supported for now)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut engine: Engine,
    rx: Receiver<CvCommand>,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }
            engine.render_block(data, channels);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
