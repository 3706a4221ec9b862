//! End-to-end tests: grid files in, audio and images out

use pixelsynth::export::{self, Snapshot};
use pixelsynth::{rng_from_seed, Config, Grid, Instrument, PixelSynthError, Renderer};

fn beat() -> Grid {
    let mut grid = Grid::default();
    for step in (0..64).step_by(16) {
        grid.paint(step, 60, Instrument::Kick);
    }
    for step in (8..64).step_by(16) {
        grid.paint(step, 40, Instrument::Snare);
    }
    for step in (0..64).step_by(4) {
        grid.paint(step, 20, Instrument::HiHat);
    }
    grid.paint(0, 10, Instrument::Bass);
    grid.paint(32, 2, Instrument::Lead);
    grid
}

#[test]
fn test_png_round_trip_at_default_zoom() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beat.png");
    let grid = beat();

    export::save_grid_png(&grid, &path, 8).unwrap();
    let loaded = export::load_grid_png(&path, 64, 64, 8).unwrap();
    assert_eq!(loaded, grid);

    let image = image::open(&path).unwrap();
    assert_eq!((image.width(), image.height()), (512, 512));
}

#[test]
fn test_load_rejects_unexpected_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.png");
    export::save_grid_png(&Grid::new(10, 10), &path, 1).unwrap();

    let err = export::load_grid_png(&path, 64, 64, 8).unwrap_err();
    assert!(matches!(err, PixelSynthError::InvalidGrid(_)));
}

#[test]
fn test_rendered_wav_covers_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beat.wav");
    let config = Config::default();

    let audio = Renderer::from_config(&config).render(&beat(), &mut rng_from_seed(Some(7)));
    export::write_wav(&path, &audio, config.sample_rate).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, 44_100);
    assert_eq!(reader.duration(), 4 * 44_100);
}

#[test]
fn test_snapshot_writes_all_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        sample_rate: 8_000,
        loop_seconds: 1,
        ..Config::default()
    };

    let snapshot =
        Snapshot::save(dir.path(), &beat(), &config, &mut rng_from_seed(Some(1))).unwrap();
    for path in [&snapshot.image, &snapshot.audio, &snapshot.spectrogram] {
        assert!(path.exists(), "{} missing", path.display());
        assert!(path.starts_with(dir.path()));
    }
    assert_eq!(export::load_grid_png(&snapshot.image, 64, 64, 8).unwrap(), beat());
}

#[test]
fn test_gif_leaves_grid_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beat.gif");
    let grid = beat();

    export::save_gif(&grid, &path, 8, 300, 2, &mut rng_from_seed(Some(3))).unwrap();
    assert!(path.metadata().unwrap().len() > 0);
    assert_eq!(grid, beat());
}
