/// WAV export: mono 16-bit PCM
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::synth::to_pcm16;

pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for sample in to_pcm16(samples) {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    info!(path = %path.display(), samples = samples.len(), "saved WAV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;

    #[test]
    fn test_wav_header_and_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.wav");
        write_wav(&path, &[0.0, 0.5, -1.0], 22_050).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22_050);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16383, -32767]);
    }
}
