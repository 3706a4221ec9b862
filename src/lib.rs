/// PixelSynth - draw music, hear colors
///
/// A 64x64 grid step sequencer where each pixel's color picks an instrument:
/// - Grid editing with a five-color instrument palette
/// - Offline rendering of the fixed-length loop
/// - Looped audio output and MIDI mirroring for live playback
/// - PNG, WAV, spectrogram and GIF export

pub mod audio;
pub mod config;
pub mod error;
pub mod export;
pub mod midi;
pub mod sequencer;
pub mod synth;

// Re-export commonly used types
pub use audio::AudioOutput;
pub use config::Config;
pub use error::{PixelSynthError, Result};
pub use export::Snapshot;
pub use midi::{midi_note_name, MidiOutputDevice};
pub use sequencer::instrument::Instrument;
pub use sequencer::playback::{PlaybackEngine, PlaybackEvent};
pub use sequencer::{Grid, Sequencer};
pub use synth::Renderer;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seeded RNG when a seed is configured, otherwise one seeded from entropy
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
