/// File export: grid images, rendered audio, spectrograms and animations
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod animation;
pub mod picture;
pub mod spectrogram;
pub mod wav;

pub use animation::save_gif;
pub use picture::{load_grid_png, save_grid_png};
pub use spectrogram::save_spectrogram;
pub use wav::write_wav;

use crate::config::Config;
use crate::error::Result;
use crate::sequencer::Grid;
use crate::synth::Renderer;

/// The files written together by one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub image: PathBuf,
    pub audio: PathBuf,
    pub spectrogram: PathBuf,
}

impl Snapshot {
    /// `pixelsynth_<timestamp>` file names inside `dir`
    pub fn paths(dir: &Path, stamp: &str) -> Self {
        let base = format!("pixelsynth_{}", stamp);
        Self {
            image: dir.join(format!("{}.png", base)),
            audio: dir.join(format!("{}.wav", base)),
            spectrogram: dir.join(format!("{}_spec.png", base)),
        }
    }

    pub fn timestamp() -> String {
        chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
    }

    /// Write the grid image, its rendered loop and the loop's spectrogram
    pub fn save<R: Rng + ?Sized>(
        dir: &Path,
        grid: &Grid,
        config: &Config,
        rng: &mut R,
    ) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let snapshot = Self::paths(dir, &Self::timestamp());

        save_grid_png(grid, &snapshot.image, config.zoom)?;
        let audio = Renderer::from_config(config).render(grid, rng);
        write_wav(&snapshot.audio, &audio, config.sample_rate)?;
        save_spectrogram(&snapshot.spectrogram, &audio)?;

        info!(dir = %dir.display(), "snapshot complete");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_paths() {
        let snapshot = Snapshot::paths(Path::new("out"), "20260101_120000");
        assert_eq!(snapshot.image, Path::new("out/pixelsynth_20260101_120000.png"));
        assert_eq!(snapshot.audio, Path::new("out/pixelsynth_20260101_120000.wav"));
        assert_eq!(
            snapshot.spectrogram,
            Path::new("out/pixelsynth_20260101_120000_spec.png")
        );
    }

    #[test]
    fn test_timestamp_shape() {
        let stamp = Snapshot::timestamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
    }
}
