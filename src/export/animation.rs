/// Animated GIF of a grid drifting through successive mutations
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame};
use rand::Rng;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use super::picture::grid_to_image;
use crate::error::Result;
use crate::sequencer::Grid;

/// First frame is `grid` as given; each later frame mutates a working copy once more
pub fn mutation_frames<R: Rng + ?Sized>(
    grid: &Grid,
    frames: usize,
    frame_ms: u32,
    zoom: u32,
    rng: &mut R,
) -> Result<Vec<Frame>> {
    let mut working = grid.clone();
    let delay = Delay::from_numer_denom_ms(frame_ms, 1);
    (0..frames)
        .map(|i| -> Result<Frame> {
            if i > 0 {
                working.mutate(rng);
            }
            let rgba = DynamicImage::ImageRgb8(grid_to_image(&working, zoom)?).to_rgba8();
            Ok(Frame::from_parts(rgba, 0, 0, delay))
        })
        .collect()
}

pub fn save_gif<R: Rng + ?Sized>(
    grid: &Grid,
    path: &Path,
    frames: usize,
    frame_ms: u32,
    zoom: u32,
    rng: &mut R,
) -> Result<()> {
    let frames = mutation_frames(grid, frames, frame_ms, zoom, rng)?;
    let count = frames.len();

    let file = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(file);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(frames)?;

    info!(path = %path.display(), frames = count, "saved GIF");
    Ok(())
}
