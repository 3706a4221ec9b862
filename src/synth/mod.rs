/// Offline synthesis: instrument voices and the loop renderer
use rand::Rng;
use std::f32::consts::PI;
use tracing::debug;

use crate::config::Config;
use crate::sequencer::instrument::Instrument;
use crate::sequencer::Grid;

/// Render one note of `len` samples starting at t = 0
pub fn render_note<R: Rng + ?Sized>(
    instrument: Instrument,
    len: usize,
    sample_rate: u32,
    rng: &mut R,
) -> Vec<f32> {
    let sr = sample_rate as f32;
    (0..len)
        .map(|i| {
            let t = i as f32 / sr;
            match instrument {
                Instrument::Kick => {
                    // pitch sweeps down as t grows
                    let env = (-t * 8.0).exp();
                    0.8 * env * (2.0 * PI * 55.0 * (1.0 - 0.5 * t) * t).sin()
                }
                Instrument::Snare => {
                    let env = (-t * 12.0).exp();
                    let noise: f32 = rng.gen_range(-1.0..1.0);
                    let tone = (2.0 * PI * 220.0 * t).sin() * 0.3;
                    env * (0.7 * noise + 0.3 * tone)
                }
                Instrument::HiHat => {
                    let env = (-t * 30.0).exp();
                    let noise: f32 = rng.gen_range(-1.0..1.0);
                    0.5 * env * noise
                }
                Instrument::Bass => {
                    let env = (-t * 4.0).exp();
                    0.7 * env * (2.0 * PI * 110.0 * t).sin()
                }
                Instrument::Lead => {
                    let env = (-t * 2.0).exp();
                    let osc = (2.0 * PI * 440.0 * t).sin()
                        + (2.0 * PI * 660.0 * t).sin() * 0.5
                        + (2.0 * PI * 880.0 * t).sin() * 0.3;
                    0.5 * env * osc
                }
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    sample_rate: u32,
    loop_seconds: u32,
}

impl Renderer {
    pub fn new(sample_rate: u32, loop_seconds: u32) -> Self {
        Self {
            sample_rate,
            loop_seconds,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sample_rate, config.loop_seconds)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn loop_samples(&self) -> usize {
        self.sample_rate as usize * self.loop_seconds as usize
    }

    /// Samples per column; the remainder of the loop is left silent
    pub fn step_samples(&self, columns: usize) -> usize {
        if columns == 0 {
            return 0;
        }
        self.loop_samples() / columns
    }

    /// Mix every lit cell into one normalised mono loop
    pub fn render<R: Rng + ?Sized>(&self, grid: &Grid, rng: &mut R) -> Vec<f32> {
        let step_samples = self.step_samples(grid.width());
        let mut audio = vec![0.0f32; self.loop_samples()];

        for x in 0..grid.width() {
            let start = x * step_samples;
            for inst in grid.column(x) {
                let note = render_note(inst, step_samples, self.sample_rate, rng);
                for (out, sample) in audio[start..start + step_samples].iter_mut().zip(note) {
                    *out += sample;
                }
            }
        }

        normalize(&mut audio);
        debug!(
            samples = audio.len(),
            lit = grid.lit_count(),
            "rendered loop"
        );
        audio
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Scale so the loudest sample sits just under full scale
pub fn normalize(audio: &mut [f32]) {
    let peak = audio.iter().fold(0.0f32, |max, s| max.max(s.abs()));
    let scale = 1.0 / (peak + 1e-6);
    for sample in audio.iter_mut() {
        *sample *= scale;
    }
}

pub fn to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples.iter().map(|s| (s * 32767.0) as i16).collect()
}
