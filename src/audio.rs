//! Synthesized sound cues: small fundsp graphs played through rodio.
//!
//! Every cue is a frequency ramp driving an oscillator under a gain
//! envelope, rendered once to a sample buffer and handed to a detached
//! sink so playback never blocks a frame.

use fundsp::prelude32::*;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

use crate::sinks::{AudioSink, Cue};

const SAMPLE_RATE: f64 = 44100.0;

pub struct Audio {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl Audio {
    /// `None` when no output device is available; the game runs silent.
    pub fn new() -> Option<Self> {
        let (stream, handle) = OutputStream::try_default().ok()?;
        Some(Self {
            _stream: stream,
            handle,
        })
    }

    fn play_samples(&self, samples: Vec<f32>) {
        if let Ok(sink) = Sink::try_new(&self.handle) {
            sink.append(SamplesBuffer::new(1, SAMPLE_RATE as u32, samples));
            sink.detach();
        }
    }
}

fn render_cue(duration: f64, unit: &mut dyn AudioUnit) -> Vec<f32> {
    let wave = Wave::render(SAMPLE_RATE, duration, unit);
    (0..wave.length()).map(|i| wave.at(0, i)).collect()
}

impl AudioSink for Audio {
    fn play(&mut self, cue: Cue) {
        let samples = match cue {
            Cue::Flap => {
                // Quick upward chirp (320Hz to 840Hz over 0.09s)
                let freq = lfo(|t: f32| lerp(320.0, 840.0, (t / 0.09).min(1.0)));
                let gain = lfo(|t: f32| lerp(0.20, 0.0, (t / 0.10).min(1.0)));
                let mut unit = (freq >> triangle()) * gain;
                render_cue(0.10, &mut unit)
            }
            Cue::Point => {
                // Two-step ding
                let freq = lfo(|t: f32| if t < 0.07 { 920.0 } else { 1245.0 });
                let gain = lfo(|t: f32| lerp(0.16, 0.0, (t / 0.14).min(1.0)));
                let mut unit = (freq >> sine()) * gain;
                render_cue(0.14, &mut unit)
            }
            Cue::Hit => {
                // Low thud (190Hz to 55Hz over 0.18s)
                let freq = lfo(|t: f32| lerp(190.0, 55.0, (t / 0.18).min(1.0)));
                let gain = lfo(|t: f32| lerp(0.25, 0.0, (t / 0.20).min(1.0)));
                let mut unit = (freq >> square()) * gain;
                render_cue(0.20, &mut unit)
            }
            Cue::Die => {
                // Falling sweep (400Hz to 80Hz over 0.4s)
                let freq = lfo(|t: f32| lerp(400.0, 80.0, (t / 0.4).min(1.0)));
                let gain = lfo(|t: f32| lerp(0.15, 0.0, (t / 0.5).min(1.0)));
                let mut unit = (freq >> saw()) * gain;
                render_cue(0.5, &mut unit)
            }
        };
        self.play_samples(samples);
    }
}

/// Stand-in sink for hosts with no audio device.
pub struct Muted;

impl AudioSink for Muted {
    fn play(&mut self, _cue: Cue) {}
}
