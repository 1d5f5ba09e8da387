//! Audio file I/O

use super::{encode_wav, SampleBuffer};
use crate::{Error, Result};
use hound::{SampleFormat, WavReader};
use std::path::Path;

/// Load a WAV file into a planar sample buffer
///
/// Integer formats are normalized by `2^(bits - 1)`; every channel is kept.
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<SampleBuffer> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }

    let reader = WavReader::open(path).map_err(|e| Error::Audio(format!("Failed to open WAV: {}", e)))?;
    let spec = reader.spec();
    let channel_count = spec.channels as usize;
    if channel_count == 0 {
        return Err(Error::InvalidFormat("WAV declares zero channels".into()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Audio(format!("Failed to read samples: {}", e)))?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::Audio(format!("Failed to read samples: {}", e)))?
        }
    };

    let frame_count = interleaved.len() / channel_count;
    let mut channels = vec![Vec::with_capacity(frame_count); channel_count];
    for frame in interleaved.chunks_exact(channel_count) {
        for (c, &sample) in frame.iter().enumerate() {
            channels[c].push(sample);
        }
    }

    log::debug!(
        "Loaded {}: {} frames x {} channel(s) at {} Hz",
        path.display(),
        frame_count,
        channel_count,
        spec.sample_rate
    );

    SampleBuffer::try_from_channels(channels, spec.sample_rate)
}

/// Encode a buffer and write it to disk
pub fn save_wav<P: AsRef<Path>>(path: P, buffer: &SampleBuffer) -> Result<()> {
    let bytes = encode_wav(buffer)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Read a base64 PCM blob from a text file
pub fn read_blob<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load_with_hound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let buf = SampleBuffer::from_channels(vec![vec![0.25, -0.5, 0.0], vec![-0.25, 0.5, 1.0]], 24000);

        save_wav(&path, &buf).unwrap();
        let loaded = load_wav(&path).unwrap();

        assert_eq!(loaded.sample_rate(), 24000);
        assert_eq!(loaded.channel_count(), 2);
        assert_eq!(loaded.frame_count(), 3);
        for c in 0..2 {
            for (a, b) in buf.channel(c).iter().zip(loaded.channel(c)) {
                assert!((a - b).abs() <= 1.0 / 32768.0 + 1e-6);
            }
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_wav("/nonexistent/recap_audio_missing.wav"),
            Err(Error::FileNotFound(_))
        ));
        assert!(matches!(
            read_blob("/nonexistent/recap_audio_missing.b64"),
            Err(Error::FileNotFound(_))
        ));
    }
}
