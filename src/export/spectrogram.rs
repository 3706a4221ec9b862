/// Spectrogram image of a rendered loop
///
/// Short-time magnitude spectrum with a Hann window, drawn time left to right and
/// frequency bottom to top. No axes or labels; the picture is meant as cover art.
use image::{ImageFormat, Rgb, RgbImage};
use rustfft::num_complex::Complex32;
use rustfft::FftPlanner;
use std::f32::consts::PI;
use std::path::Path;
use tracing::info;

use crate::error::Result;

pub const WINDOW: usize = 256;
pub const HOP: usize = 128;
const DYNAMIC_RANGE_DB: f32 = 80.0;
const SILENCE_POWER: f32 = 1e-12;
/// The dB floor never sinks below this, so silence draws black
const SILENCE_DB: f32 = -100.0;

/// Power in dB, one `Vec` of `WINDOW / 2 + 1` bins per frame
pub fn power_frames(samples: &[f32]) -> Vec<Vec<f32>> {
    let bins = WINDOW / 2 + 1;
    let hann: Vec<f32> = (0..WINDOW)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / WINDOW as f32).cos())
        .collect();
    let fft = FftPlanner::<f32>::new().plan_fft_forward(WINDOW);

    let frame_count = if samples.len() <= WINDOW {
        1
    } else {
        (samples.len() - WINDOW) / HOP + 1
    };

    let mut buf = vec![Complex32::new(0.0, 0.0); WINDOW];
    (0..frame_count)
        .map(|f| {
            let start = f * HOP;
            for (n, slot) in buf.iter_mut().enumerate() {
                let x = samples.get(start + n).copied().unwrap_or(0.0) * hann[n];
                *slot = Complex32::new(x, 0.0);
            }
            fft.process(&mut buf);
            buf[..bins]
                .iter()
                .map(|c| 10.0 * (c.norm_sqr() + SILENCE_POWER).log10())
                .collect()
        })
        .collect()
}

/// Dark blue through green and yellow to white
fn color_ramp(level: f32) -> Rgb<u8> {
    const STOPS: [[f32; 3]; 6] = [
        [0.0, 0.0, 0.0],
        [70.0, 0.0, 140.0],
        [0.0, 110.0, 220.0],
        [0.0, 200.0, 80.0],
        [250.0, 220.0, 0.0],
        [255.0, 255.0, 255.0],
    ];
    let level = level.clamp(0.0, 1.0) * (STOPS.len() - 1) as f32;
    let lower = (level.floor() as usize).min(STOPS.len() - 2);
    let frac = level - lower as f32;
    let (a, b) = (STOPS[lower], STOPS[lower + 1]);
    Rgb([0, 1, 2].map(|c| (a[c] + (b[c] - a[c]) * frac).round() as u8))
}

pub fn spectrogram_image(samples: &[f32]) -> RgbImage {
    let frames = power_frames(samples);
    let bins = WINDOW / 2 + 1;
    let peak = frames
        .iter()
        .flatten()
        .fold(f32::NEG_INFINITY, |m, db| m.max(*db));
    let floor = (peak - DYNAMIC_RANGE_DB).max(SILENCE_DB);

    RgbImage::from_fn(frames.len() as u32, bins as u32, |x, y| {
        let db = frames[x as usize][bins - 1 - y as usize];
        color_ramp((db - floor) / DYNAMIC_RANGE_DB)
    })
}

pub fn save_spectrogram(path: &Path, samples: &[f32]) -> Result<()> {
    spectrogram_image(samples).save_with_format(path, ImageFormat::Png)?;
    info!(path = %path.display(), "saved spectrogram");
    Ok(())
}
