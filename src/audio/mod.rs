/// Audio output using cpal: plays a rendered loop buffer until stopped
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::error::{PixelSynthError, Result};

#[derive(Debug, Default)]
struct LoopState {
    samples: Vec<f32>,
    cursor: usize,
    playing: bool,
}

impl LoopState {
    fn next_sample(&mut self) -> f32 {
        if !self.playing || self.samples.is_empty() {
            return 0.0;
        }
        let sample = self.samples[self.cursor];
        self.cursor = (self.cursor + 1) % self.samples.len();
        sample
    }
}

fn lock_state(state: &Mutex<LoopState>) -> MutexGuard<'_, LoopState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct AudioOutput {
    _stream: cpal::Stream,
    state: Arc<Mutex<LoopState>>,
    sample_rate: u32,
}

impl AudioOutput {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PixelSynthError::audio("no output device available"))?;
        let config = device
            .default_output_config()
            .map_err(|e| PixelSynthError::audio(format!("no output config: {}", e)))?;

        let sample_rate = config.sample_rate().0;
        let state = Arc::new(Mutex::new(LoopState::default()));

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config.into(), Arc::clone(&state))?
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config.into(), Arc::clone(&state))?
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config.into(), Arc::clone(&state))?
            }
            other => {
                return Err(PixelSynthError::audio(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        };

        stream
            .play()
            .map_err(|e| PixelSynthError::audio(format!("failed to start stream: {}", e)))?;

        let name = device.name().unwrap_or_else(|_| "unknown".to_string());
        info!(device = %name, sample_rate, "audio output opened");

        Ok(Self {
            _stream: stream,
            state,
            sample_rate,
        })
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        state: Arc<Mutex<LoopState>>,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let channels = config.channels as usize;

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let mut loop_state = lock_state(&state);
                    // Mono loop copied to every channel of the frame
                    for frame in data.chunks_mut(channels) {
                        let value = T::from_sample(loop_state.next_sample());
                        for sample in frame.iter_mut() {
                            *sample = value;
                        }
                    }
                },
                |err| warn!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| PixelSynthError::audio(format!("failed to build stream: {}", e)))
    }

    /// Device rate; render loops at this rate to avoid resampling
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Replace the loop and play it from the start, forever
    pub fn play_loop(&mut self, samples: Vec<f32>) {
        let mut state = lock_state(&self.state);
        state.samples = samples;
        state.cursor = 0;
        state.playing = true;
    }

    pub fn stop(&mut self) {
        let mut state = lock_state(&self.state);
        state.playing = false;
        state.cursor = 0;
    }

    pub fn is_playing(&self) -> bool {
        lock_state(&self.state).playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_state_wraps() {
        let mut state = LoopState {
            samples: vec![0.1, 0.2, 0.3],
            cursor: 0,
            playing: true,
        };
        let out: Vec<f32> = (0..7).map(|_| state.next_sample()).collect();
        assert_eq!(out, vec![0.1, 0.2, 0.3, 0.1, 0.2, 0.3, 0.1]);
    }

    #[test]
    fn test_loop_state_silent_when_stopped_or_empty() {
        let mut state = LoopState::default();
        state.playing = true;
        assert_eq!(state.next_sample(), 0.0);

        let mut state = LoopState {
            samples: vec![0.5],
            cursor: 0,
            playing: false,
        };
        assert_eq!(state.next_sample(), 0.0);
        assert_eq!(state.cursor, 0);
    }
}
