/// Error types shared by every PixelSynth module
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PixelSynthError {
    /// File system errors (reading grids, writing exports)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG/GIF encoding and decoding
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// WAV encoding
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Config file parsing
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// A grid image that cannot be mapped onto the grid
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// Output device or stream failures
    #[error("Audio error: {0}")]
    Audio(String),

    /// MIDI port or send failures
    #[error("MIDI error: {0}")]
    Midi(String),

    /// Malformed user input such as cell coordinates
    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, PixelSynthError>;

impl PixelSynthError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    pub fn midi(msg: impl Into<String>) -> Self {
        Self::Midi(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
