/// Grid <-> PNG: grids are stored as images of palette colors
use image::{ImageFormat, Rgb, RgbImage};
use std::path::Path;
use tracing::info;

use crate::error::{PixelSynthError, Result};
use crate::sequencer::Grid;

fn scaled_side(cells: usize, zoom: u32) -> Result<u32> {
    u32::try_from(cells)
        .ok()
        .and_then(|cells| cells.checked_mul(zoom))
        .ok_or_else(|| {
            PixelSynthError::invalid_grid(format!("{} cells at zoom {} is too large", cells, zoom))
        })
}

/// Nearest-neighbour upscale: every cell becomes a `zoom`×`zoom` block
pub fn grid_to_image(grid: &Grid, zoom: u32) -> Result<RgbImage> {
    let zoom = zoom.max(1);
    let width = scaled_side(grid.width(), zoom)?;
    let height = scaled_side(grid.height(), zoom)?;
    Ok(RgbImage::from_fn(width, height, |px, py| {
        Rgb(grid.rgb((px / zoom) as usize, (py / zoom) as usize))
    }))
}

/// Accepts either one pixel per cell or `zoom` pixels per cell
pub fn image_to_grid(image: &RgbImage, width: usize, height: usize, zoom: u32) -> Result<Grid> {
    let (img_w, img_h) = image.dimensions();
    let scale = if img_w as usize == width && img_h as usize == height {
        1
    } else if img_w as usize == width * zoom as usize && img_h as usize == height * zoom as usize {
        zoom
    } else {
        return Err(PixelSynthError::invalid_grid(format!(
            "image is {}x{}, expected {}x{} or {}x{}",
            img_w,
            img_h,
            width,
            height,
            width * zoom as usize,
            height * zoom as usize
        )));
    };

    let mut grid = Grid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let pixel = image.get_pixel(x as u32 * scale, y as u32 * scale);
            grid.set_rgb(x, y, pixel.0);
        }
    }
    Ok(grid)
}

pub fn save_grid_png(grid: &Grid, path: &Path, zoom: u32) -> Result<()> {
    grid_to_image(grid, zoom)?.save_with_format(path, ImageFormat::Png)?;
    info!(path = %path.display(), "saved grid image");
    Ok(())
}

pub fn load_grid_png(path: &Path, width: usize, height: usize, zoom: u32) -> Result<Grid> {
    let image = image::open(path)?.to_rgb8();
    let grid = image_to_grid(&image, width, height, zoom)?;
    info!(path = %path.display(), lit = grid.lit_count(), "loaded grid image");
    Ok(grid)
}
