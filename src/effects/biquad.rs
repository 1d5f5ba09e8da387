//! Second-order IIR equalizer sections
//!
//! Coefficients follow the Audio EQ Cookbook (R. Bristow-Johnson), the same
//! formulas the Web Audio `BiquadFilterNode` specifies.

use super::{RenderContext, Stage};
use crate::{audio::SampleBuffer, Result};
use std::f64::consts::PI;

/// Equalizer response shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    /// Boost/cut above `frequency` (shelf slope 1)
    HighShelf { frequency: f64, gain_db: f64 },
    /// Bell around `frequency` with bandwidth `q`
    Peaking { frequency: f64, q: f64, gain_db: f64 },
}

/// Normalized biquad coefficients (`a0 == 1`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoefficients {
    /// Pass-through with a constant gain
    pub fn flat(gain: f64) -> Self {
        Self {
            b0: gain,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    pub fn design(kind: FilterKind, sample_rate: u32) -> Self {
        match kind {
            FilterKind::HighShelf { frequency, gain_db } => Self::high_shelf(sample_rate, frequency, gain_db),
            FilterKind::Peaking { frequency, q, gain_db } => Self::peaking(sample_rate, frequency, q, gain_db),
        }
    }

    pub fn high_shelf(sample_rate: u32, frequency: f64, gain_db: f64) -> Self {
        let a = 10f64.powf(gain_db / 40.0);
        let nyquist = sample_rate as f64 / 2.0;

        // Cutoff at or beyond Nyquist: the whole band is "below" the shelf
        if frequency >= nyquist {
            return Self::flat(1.0);
        }
        // Cutoff at DC: the whole band is on the shelf
        if frequency <= 0.0 {
            return Self::flat(a * a);
        }

        let w0 = 2.0 * PI * frequency / sample_rate as f64;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / 2.0 * 2f64.sqrt();
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        let b0 = a * ((a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha);
        let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0);
        let b2 = a * ((a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha);
        let a0 = (a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha;
        let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_w0);
        let a2 = (a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    pub fn peaking(sample_rate: u32, frequency: f64, q: f64, gain_db: f64) -> Self {
        let a = 10f64.powf(gain_db / 40.0);
        let nyquist = sample_rate as f64 / 2.0;

        if frequency <= 0.0 || frequency >= nyquist {
            return Self::flat(1.0);
        }
        if q <= 0.0 {
            return Self::flat(a * a);
        }

        let w0 = 2.0 * PI * frequency / sample_rate as f64;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);

        let b0 = 1.0 + alpha * a;
        let b1 = -2.0 * cos_w0;
        let b2 = 1.0 - alpha * a;
        let a0 = 1.0 + alpha / a;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha / a;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Magnitude response |H(e^jw)| at `frequency`
    pub fn magnitude_at(&self, frequency: f64, sample_rate: u32) -> f64 {
        let w = 2.0 * PI * frequency / sample_rate as f64;
        let (s1, c1) = w.sin_cos();
        let (s2, c2) = (2.0 * w).sin_cos();

        let num_re = self.b0 + self.b1 * c1 + self.b2 * c2;
        let num_im = -(self.b1 * s1 + self.b2 * s2);
        let den_re = 1.0 + self.a1 * c1 + self.a2 * c2;
        let den_im = -(self.a1 * s1 + self.a2 * s2);

        ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt()
    }

    /// Run one channel through the section (transposed direct form II)
    pub fn filter(&self, input: &[f32]) -> Vec<f32> {
        let mut z1 = 0.0f64;
        let mut z2 = 0.0f64;

        input
            .iter()
            .map(|&x| {
                let x = x as f64;
                let y = self.b0 * x + z1;
                z1 = self.b1 * x - self.a1 * y + z2;
                z2 = self.b2 * x - self.a2 * y;
                y as f32
            })
            .collect()
    }
}

/// Equalizer stage; coefficients are designed against the render rate
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    name: &'static str,
    kind: FilterKind,
}

impl Biquad {
    pub fn new(name: &'static str, kind: FilterKind) -> Self {
        Self { name, kind }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }
}

impl Stage for Biquad {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, ctx: &RenderContext, input: &SampleBuffer) -> Result<SampleBuffer> {
        use rayon::prelude::*;

        let coefficients = BiquadCoefficients::design(self.kind, ctx.sample_rate);
        let channels: Vec<Vec<f32>> = input
            .channels()
            .par_iter()
            .map(|c| coefficients.filter(c))
            .collect();

        Ok(SampleBuffer::from_channels(channels, input.sample_rate()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_db(x: f64) -> f64 {
        20.0 * x.log10()
    }

    #[test]
    fn test_high_shelf_response() {
        let c = BiquadCoefficients::high_shelf(24000, 5000.0, 4.0);
        assert!(to_db(c.magnitude_at(0.0, 24000)).abs() < 1e-6);
        assert!((to_db(c.magnitude_at(12000.0, 24000)) - 4.0).abs() < 1e-6);
        // Half the shelf gain at the corner frequency
        assert!((to_db(c.magnitude_at(5000.0, 24000)) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_peaking_response() {
        let c = BiquadCoefficients::peaking(24000, 200.0, 0.5, 2.0);
        assert!((to_db(c.magnitude_at(200.0, 24000)) - 2.0).abs() < 1e-6);
        assert!(to_db(c.magnitude_at(0.0, 24000)).abs() < 1e-6);
        assert!(to_db(c.magnitude_at(11000.0, 24000)) < 0.5);
    }

    #[test]
    fn test_cutoff_above_nyquist_degenerates() {
        let shelf = BiquadCoefficients::high_shelf(8000, 5000.0, 4.0);
        assert_eq!(shelf, BiquadCoefficients::flat(1.0));
        let peak = BiquadCoefficients::peaking(300, 200.0, 0.5, 2.0);
        assert_eq!(peak, BiquadCoefficients::flat(1.0));
    }

    #[test]
    fn test_filter_dc_settles_to_dc_gain() {
        let c = BiquadCoefficients::high_shelf(24000, 5000.0, 4.0);
        let out = c.filter(&vec![0.5; 4000]);
        assert!((out[3999] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_flat_filter_scales() {
        let out = BiquadCoefficients::flat(2.0).filter(&[0.25, -0.25]);
        assert_eq!(out, vec![0.5, -0.5]);
    }
}
