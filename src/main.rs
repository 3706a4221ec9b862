//! PixelSynth command line entry point

mod cli;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use pixelsynth::export::{self, Snapshot};
use pixelsynth::{
    rng_from_seed, AudioOutput, Config, Grid, MidiOutputDevice, PlaybackEngine, PlaybackEvent,
    Renderer, Sequencer,
};

/// Initialize tracing; RUST_LOG overrides the default `info` level
fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse_args();
    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Render {
            grid,
            wav,
            spectrogram,
            seed,
        } => {
            let grid = load_grid(grid.as_deref(), &config)?;
            let mut rng = rng_from_seed(seed.or(config.seed));
            let audio = Renderer::from_config(&config).render(&grid, &mut rng);
            export::write_wav(&wav, &audio, config.sample_rate)
                .with_context(|| format!("failed to write {}", wav.display()))?;
            if let Some(path) = spectrogram {
                export::save_spectrogram(&path, &audio)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
        }
        Commands::Snapshot { grid, dir, seed } => {
            let grid = load_grid(grid.as_deref(), &config)?;
            let mut rng = rng_from_seed(seed.or(config.seed));
            let snapshot = Snapshot::save(&dir, &grid, &config, &mut rng)
                .with_context(|| format!("failed to save snapshot in {}", dir.display()))?;
            println!("{}", snapshot.image.display());
            println!("{}", snapshot.audio.display());
            println!("{}", snapshot.spectrogram.display());
        }
        Commands::Edit {
            grid,
            out,
            paint,
            erase,
            reset,
            mutate,
            seed,
        } => {
            let mut grid = load_grid(grid.as_deref(), &config)?;
            if reset {
                grid.clear();
            }
            for (x, y, instrument) in paint {
                if x >= grid.width() || y >= grid.height() {
                    warn!(x, y, "cell outside grid, ignored");
                }
                grid.paint(x, y, instrument);
            }
            for (x, y) in erase {
                grid.erase(x, y);
            }
            let mut rng = rng_from_seed(seed.or(config.seed));
            for _ in 0..mutate {
                grid.mutate(&mut rng);
            }
            export::save_grid_png(&grid, &out, config.zoom)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(lit = grid.lit_count(), "grid saved");
        }
        Commands::Gif {
            grid,
            out,
            frames,
            delay_ms,
            seed,
        } => {
            let grid = load_grid(grid.as_deref(), &config)?;
            let mut rng = rng_from_seed(seed.or(config.seed));
            export::save_gif(
                &grid,
                &out,
                frames.unwrap_or(config.gif_frames).max(1),
                delay_ms.unwrap_or(config.gif_frame_ms),
                config.zoom,
                &mut rng,
            )
            .with_context(|| format!("failed to write {}", out.display()))?;
        }
        Commands::Play {
            grid,
            midi_port,
            velocity,
            seconds,
            seed,
        } => {
            let grid = load_grid(grid.as_deref(), &config)?;
            run_play(grid, &config, midi_port, velocity, seconds, seed)?;
        }
        Commands::Ports => {
            let ports = MidiOutputDevice::available_ports();
            if ports.is_empty() {
                println!("No MIDI output ports available");
            }
            for (i, name) in ports.iter().enumerate() {
                println!("{}: {}", i, name);
            }
        }
    }

    Ok(())
}

fn load_grid(path: Option<&Path>, config: &Config) -> Result<Grid> {
    match path {
        Some(path) => export::load_grid_png(path, config.grid_width, config.grid_height, config.zoom)
            .with_context(|| format!("failed to load grid {}", path.display())),
        None => Ok(Grid::new(config.grid_width, config.grid_height)),
    }
}

fn run_play(
    grid: Grid,
    config: &Config,
    midi_port: Option<usize>,
    velocity: u8,
    seconds: Option<f64>,
    seed: Option<u64>,
) -> Result<()> {
    let stop_requested = Arc::new(AtomicBool::new(false));
    {
        let stop_requested = Arc::clone(&stop_requested);
        ctrlc::set_handler(move || stop_requested.store(true, Ordering::SeqCst))
            .context("failed to install Ctrl-C handler")?;
    }

    let mut midi_output = MidiOutputDevice::new();
    midi_output.set_velocity(velocity);
    if let Some(port) = midi_port {
        midi_output.connect(port).context("failed to open MIDI port")?;
    }

    let mut audio_output = AudioOutput::new().context("failed to open audio output")?;
    let mut rng = rng_from_seed(seed.or(config.seed));
    // Render at the device rate so the loop length stays exact
    let renderer = Renderer::new(audio_output.sample_rate(), config.loop_seconds);
    let audio = renderer.render(&grid, &mut rng);

    let mut sequencer = Sequencer::new(grid, config.loop_duration());
    let mut playback_engine = PlaybackEngine::new();

    let started = Instant::now();
    audio_output.play_loop(audio);
    sequencer.start(started);
    playback_engine.start(config.step_duration(), sequencer.grid_state().clone());
    info!(
        lit = sequencer.grid().lit_count(),
        "playing; press Ctrl-C to stop"
    );

    let deadline = seconds
        .and_then(|s| Duration::try_from_secs_f64(s.max(0.0)).ok())
        .map(|d| started + d);
    while !stop_requested.load(Ordering::SeqCst)
        && deadline.map_or(true, |d| Instant::now() < d)
    {
        for event in playback_engine.poll_events() {
            match event {
                PlaybackEvent::StepAdvanced(column) => {
                    if column == 0 {
                        debug!("loop start");
                    }
                    let playhead = sequencer.playhead_column(Instant::now());
                    debug!(column, ?playhead, "step");
                }
                PlaybackEvent::Trigger { instrument, .. } => {
                    if let Err(e) = midi_output.trigger(instrument) {
                        warn!("{}", e);
                    }
                }
                PlaybackEvent::NoteOff(instrument) => {
                    if let Err(e) = midi_output.release(instrument) {
                        warn!("{}", e);
                    }
                }
            }
        }
        thread::sleep(Duration::from_millis(5));
    }

    playback_engine.stop();
    sequencer.stop();
    audio_output.stop();
    midi_output.release_all()?;
    midi_output.disconnect();
    Ok(())
}
