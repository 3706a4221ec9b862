/// Engine settings: grid size, loop timing, export options
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{PixelSynthError, Result};

pub const GRID_SIZE: usize = 64;
pub const SAMPLE_RATE: u32 = 44_100;
pub const LOOP_SECONDS: u32 = 4;
pub const PIXEL_ZOOM: u32 = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid_width: usize,
    pub grid_height: usize,
    pub sample_rate: u32,
    pub loop_seconds: u32,
    pub zoom: u32,
    /// Seed for noise voices and mutation; `None` draws from entropy
    pub seed: Option<u64>,
    pub gif_frames: usize,
    pub gif_frame_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_width: GRID_SIZE,
            grid_height: GRID_SIZE,
            sample_rate: SAMPLE_RATE,
            loop_seconds: LOOP_SECONDS,
            zoom: PIXEL_ZOOM,
            seed: None,
            gif_frames: 8,
            gif_frame_ms: 300,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(PixelSynthError::config("grid dimensions must be non-zero"));
        }
        if self.sample_rate == 0 {
            return Err(PixelSynthError::config("sample rate must be non-zero"));
        }
        if self.loop_seconds == 0 {
            return Err(PixelSynthError::config("loop length must be non-zero"));
        }
        if self.zoom == 0 {
            return Err(PixelSynthError::config("zoom must be non-zero"));
        }
        let max_side = self.grid_width.max(self.grid_height) as u64;
        if max_side * self.zoom as u64 > u32::MAX as u64 {
            return Err(PixelSynthError::config(format!(
                "zoom {} makes a {}-cell side too large for an image",
                self.zoom, max_side
            )));
        }
        if self.gif_frames == 0 {
            return Err(PixelSynthError::config("GIF needs at least one frame"));
        }
        let loop_samples = self.sample_rate as usize * self.loop_seconds as usize;
        if loop_samples / self.grid_width == 0 {
            return Err(PixelSynthError::config(format!(
                "{} columns leave no samples per step",
                self.grid_width
            )));
        }
        Ok(())
    }

    pub fn loop_duration(&self) -> Duration {
        Duration::from_secs(self.loop_seconds as u64)
    }

    pub fn step_duration(&self) -> Duration {
        self.loop_duration() / self.grid_width as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.grid_width, 64);
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.step_duration(), Duration::from_millis(62) + Duration::from_micros(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"loop_seconds": 2, "seed": 7}"#).unwrap();
        assert_eq!(config.loop_seconds, 2);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.zoom, PIXEL_ZOOM);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let config = Config {
            grid_width: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(PixelSynthError::Config(_))));

        let config = Config {
            sample_rate: 10,
            loop_seconds: 1,
            grid_width: 64,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_zoom() {
        let config = Config {
            zoom: u32::MAX / 32,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(PixelSynthError::Config(_))));

        let config = Config {
            zoom: 64,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixelsynth.json");
        let config = Config {
            seed: Some(42),
            gif_frames: 4,
            ..Config::default()
        };
        config.save_to_file(&path).unwrap();
        assert_eq!(Config::load_from_file(&path).unwrap(), config);
    }
}
