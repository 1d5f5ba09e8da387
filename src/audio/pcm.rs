//! Base64 PCM16 decoding

use super::SampleBuffer;
use crate::{Error, Result};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

/// Scale applied to signed 16-bit integers when normalizing
pub const PCM16_SCALE: f32 = 32768.0;

/// Standard alphabet, `=` padding optional, stray trailing bits ignored
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Reverse the base64 text encoding into raw bytes
///
/// ASCII whitespace (line wraps, trailing newlines) is ignored and the
/// trailing `=` padding may be left off. Any other invalid input is a
/// [`Error::Decode`].
pub fn decode(blob: &str) -> Result<Vec<u8>> {
    let compact: String = blob.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = FORGIVING.decode(compact.as_bytes())?;
    Ok(bytes)
}

/// Interpret bytes as interleaved signed 16-bit little-endian PCM
///
/// Trailing partial frames and a dangling odd byte are dropped.
pub fn decode_to_sample_buffer(
    bytes: &[u8],
    sample_rate: u32,
    channel_count: usize,
) -> Result<SampleBuffer> {
    if sample_rate == 0 {
        return Err(Error::Decode("sample rate must be > 0".into()));
    }
    if channel_count == 0 {
        return Err(Error::Decode("channel count must be > 0".into()));
    }

    let int16_count = bytes.len() / 2;
    let frame_count = int16_count / channel_count;
    let used_bytes = frame_count * channel_count * 2;

    if used_bytes < bytes.len() {
        log::warn!(
            "Discarding {} trailing byte(s) that do not form a complete frame",
            bytes.len() - used_bytes
        );
    }

    let mut channels = vec![Vec::with_capacity(frame_count); channel_count];
    for frame in bytes[..used_bytes].chunks_exact(channel_count * 2) {
        for (c, pair) in frame.chunks_exact(2).enumerate() {
            let sample = i16::from_le_bytes([pair[0], pair[1]]);
            channels[c].push(sample as f32 / PCM16_SCALE);
        }
    }

    log::debug!(
        "Decoded {} frames x {} channel(s) at {} Hz",
        frame_count,
        channel_count,
        sample_rate
    );

    Ok(SampleBuffer::from_channels(channels, sample_rate))
}

/// Decode a base64 blob straight into a sample buffer
pub fn decode_blob(blob: &str, sample_rate: u32, channel_count: usize) -> Result<SampleBuffer> {
    let bytes = decode(blob)?;
    decode_to_sample_buffer(&bytes, sample_rate, channel_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn to_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode("not base64 !!"), Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_ignores_whitespace() {
        let encoded = base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3, 4, 5, 6]);
        let wrapped = format!("{}\n{}\n", &encoded[..4], &encoded[4..]);
        assert_eq!(decode(&wrapped).unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_decode_accepts_missing_padding() {
        assert_eq!(decode("AAA").unwrap(), vec![0, 0]);
        assert_eq!(decode("AAA=").unwrap(), vec![0, 0]);
        assert_eq!(decode("AQIDBA").unwrap(), vec![1, 2, 3, 4]);
        // Non-zero bits past the last whole byte are dropped
        assert_eq!(decode("AAB").unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_unpadded_blob_decodes_to_samples() {
        let buf = decode_blob("AAA", 24000, 1).unwrap();
        assert_eq!(buf.frame_count(), 1);
        assert_eq!(buf.channel(0)[0], 0.0);
    }

    #[test]
    fn test_normalization() {
        let bytes = to_bytes(&[i16::MIN, -16384, 0, 16384, i16::MAX]);
        let buf = decode_to_sample_buffer(&bytes, 24000, 1).unwrap();
        let ch = buf.channel(0);
        assert_eq!(ch[0], -1.0);
        assert_eq!(ch[1], -0.5);
        assert_eq!(ch[2], 0.0);
        assert_eq!(ch[3], 0.5);
        assert!((ch[4] - 0.999_969_5).abs() < 1e-6);
    }

    #[test]
    fn test_deinterleave_stereo() {
        let bytes = to_bytes(&[100, -100, 200, -200, 300, -300]);
        let buf = decode_to_sample_buffer(&bytes, 48000, 2).unwrap();
        assert_eq!(buf.frame_count(), 3);
        assert_eq!(buf.channel(0)[2], 300.0 / 32768.0);
        assert_eq!(buf.channel(1)[1], -200.0 / 32768.0);
    }

    #[test]
    fn test_partial_frame_truncated() {
        // 5 int16 values + 1 odd byte, 2 channels -> 2 full frames
        let mut bytes = to_bytes(&[1, 2, 3, 4, 5]);
        bytes.push(0x7f);
        let buf = decode_to_sample_buffer(&bytes, 24000, 2).unwrap();
        assert_eq!(buf.frame_count(), 2);
        assert_eq!(buf.channel_count(), 2);
    }

    #[test]
    fn test_empty_input() {
        let buf = decode_to_sample_buffer(&[], 24000, 1).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_zero_channels_is_error() {
        assert!(matches!(
            decode_to_sample_buffer(&[0, 0], 24000, 0),
            Err(Error::Decode(_))
        ));
    }
}
