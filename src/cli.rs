use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pixelsynth::{Instrument, PixelSynthError};

/// PixelSynth - draw music, hear colors
#[derive(Parser)]
#[command(name = "pixelsynth")]
#[command(about = "A 64x64 pixel grid step sequencer: pixel colors trigger instruments")]
#[command(version)]
pub struct Cli {
    /// JSON config file (grid size, sample rate, loop length, zoom, seed)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a grid image to a WAV loop
    Render {
        /// Grid PNG (blank grid when omitted)
        grid: Option<PathBuf>,
        /// Output WAV file
        #[arg(long)]
        wav: PathBuf,
        /// Also write a spectrogram PNG
        #[arg(long)]
        spectrogram: Option<PathBuf>,
        /// Seed for the noise voices
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Save timestamped grid image, WAV and spectrogram together
    Snapshot {
        grid: Option<PathBuf>,
        /// Output directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Edit a grid: reset, then paint, then erase, then mutate
    Edit {
        grid: Option<PathBuf>,
        /// Output grid PNG
        #[arg(short, long)]
        out: PathBuf,
        /// Paint a cell, e.g. `3,10=kick` or `3,10=1`
        #[arg(long, value_parser = parse_paint)]
        paint: Vec<(usize, usize, Instrument)>,
        /// Erase a cell, e.g. `3,10`
        #[arg(long, value_parser = parse_cell)]
        erase: Vec<(usize, usize)>,
        /// Clear the whole grid first
        #[arg(long)]
        reset: bool,
        /// Number of mutation passes to apply
        #[arg(long, default_value_t = 0)]
        mutate: u32,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Save an animated GIF of successive mutations
    Gif {
        grid: Option<PathBuf>,
        #[arg(short, long)]
        out: PathBuf,
        /// Frame count (config default: 8)
        #[arg(long)]
        frames: Option<usize>,
        /// Delay between frames in milliseconds (config default: 300)
        #[arg(long)]
        delay_ms: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Loop the grid on the default audio device until Ctrl-C
    Play {
        grid: Option<PathBuf>,
        /// Mirror triggers to this MIDI output port index
        #[arg(long)]
        midi_port: Option<usize>,
        /// MIDI note-on velocity
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(1..=127))]
        velocity: u8,
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List MIDI output ports
    Ports,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

pub fn parse_cell(s: &str) -> Result<(usize, usize), PixelSynthError> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| PixelSynthError::parse(format!("expected X,Y, got '{}'", s)))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|e| PixelSynthError::parse(format!("bad coordinate '{}': {}", v, e)))
    };
    Ok((coord(x)?, coord(y)?))
}

pub fn parse_paint(s: &str) -> Result<(usize, usize, Instrument), PixelSynthError> {
    let (cell, name) = s
        .split_once('=')
        .ok_or_else(|| PixelSynthError::parse(format!("expected X,Y=INSTRUMENT, got '{}'", s)))?;
    let (x, y) = parse_cell(cell)?;
    let instrument = name
        .trim()
        .parse::<Instrument>()
        .map_err(|_| PixelSynthError::parse(format!("unknown instrument '{}'", name)))?;
    Ok((x, y, instrument))
}
