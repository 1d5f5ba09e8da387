//! Digital Signal Processing utilities

/// Silence floor used when converting zero amplitude to decibels
pub const MIN_DB: f32 = -120.0;

/// Convert decibels to linear amplitude
///
/// `gain = 10^(db / 20)`
pub fn db_to_linear(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels, floored at [`MIN_DB`]
pub fn linear_to_db(amplitude: f32) -> f32 {
    if amplitude <= 0.0 {
        return MIN_DB;
    }
    (20.0 * amplitude.log10()).max(MIN_DB)
}

/// One-pole smoothing coefficient for a time constant
///
/// A zero (or negative) time constant gives an instantaneous response.
pub fn time_constant_coef(seconds: f32, sample_rate: u32) -> f32 {
    if seconds <= 0.0 || sample_rate == 0 {
        return 0.0;
    }
    (-1.0 / (seconds * sample_rate as f32)).exp()
}

/// Compute RMS energy
pub fn compute_rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|x| x * x).sum::<f32>() / signal.len() as f32).sqrt()
}

/// Compute peak amplitude
pub fn compute_peak(signal: &[f32]) -> f32 {
    signal.iter().map(|x| x.abs()).fold(0.0f32, f32::max)
}
