//! Normalized line shapes: Gaussian, Lorentzian and their Voigt convolution.
//!
//! Every profile integrates to one over the real line. The Voigt profile is
//! `Re w(z) / (sigma * sqrt(2 pi))` with `z = (x - mean + i gamma) / (sigma * sqrt 2)`
//! and `w` the Faddeeva function. Zero widths are dispatched to the closed
//! forms because the general formula divides by `sigma`.

use std::f64::consts::{PI, SQRT_2};
use std::sync::OnceLock;

use num_complex::Complex64;

const SQRT_2PI: f64 = 2.506_628_274_631_000_7;
const FRAC_1_SQRT_PI: f64 = 0.564_189_583_547_756_3;

/// Number of terms in the rational expansion of the Faddeeva function.
const FADDEEVA_TERMS: usize = 32;

/// Which closed form a (gamma, sigma) pair selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Gaussian,
    Lorentzian,
    Voigt,
    /// Both widths zero: no finite density exists.
    Degenerate,
}

/// A line shape centred on `mean`.
///
/// `hwhm` is the Lorentzian half width at half maximum, `sigma` the Gaussian
/// standard deviation, both in the units of `mean`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoigtProfile {
    pub mean: f64,
    pub hwhm: f64,
    pub sigma: f64,
}

impl VoigtProfile {
    pub fn new(mean: f64, hwhm: f64, sigma: f64) -> Self {
        Self { mean, hwhm, sigma }
    }

    pub fn kind(&self) -> ProfileKind {
        match (self.hwhm > 0.0, self.sigma > 0.0) {
            (false, true) => ProfileKind::Gaussian,
            (true, false) => ProfileKind::Lorentzian,
            (true, true) => ProfileKind::Voigt,
            (false, false) => ProfileKind::Degenerate,
        }
    }

    /// Density at a single point. Degenerate profiles evaluate to 0.
    pub fn density(&self, x: f64) -> f64 {
        let dx = x - self.mean;
        match self.kind() {
            ProfileKind::Gaussian => {
                let u = dx / self.sigma;
                (-0.5 * u * u).exp() / (self.sigma * SQRT_2PI)
            }
            ProfileKind::Lorentzian => (self.hwhm / PI) / (dx * dx + self.hwhm * self.hwhm),
            ProfileKind::Voigt => {
                let z = Complex64::new(dx, self.hwhm) / (self.sigma * SQRT_2);
                faddeeva(z).re / (self.sigma * SQRT_2PI)
            }
            ProfileKind::Degenerate => 0.0,
        }
    }

    pub fn evaluate(&self, x: &[f64]) -> Vec<f64> {
        if self.kind() == ProfileKind::Degenerate {
            tracing::warn!(mean = self.mean, "voigt: sigma = 0 and hwhm = 0, returning zeros");
            return vec![0.0; x.len()];
        }
        x.iter().map(|&xi| self.density(xi)).collect()
    }
}

/// Voigt density over `x`; see [`VoigtProfile`].
pub fn voigt(x: &[f64], mean: f64, hwhm: f64, sigma: f64) -> Vec<f64> {
    VoigtProfile::new(mean, hwhm, sigma).evaluate(x)
}

/// Coefficients of Weideman's rational approximation, computed once.
fn faddeeva_coefficients() -> &'static (f64, [f64; FADDEEVA_TERMS]) {
    static COEFFS: OnceLock<(f64, [f64; FADDEEVA_TERMS])> = OnceLock::new();
    COEFFS.get_or_init(|| {
        let n = FADDEEVA_TERMS;
        let m = 2 * n;
        let l = (n as f64 / SQRT_2).sqrt();

        // f(t_k) = exp(-t^2) (L^2 + t^2) sampled at t_k = L tan(k pi / 2M).
        // f is even in k, so the DFT collapses to a cosine sum.
        let f = |k: usize| {
            let t = l * (k as f64 * PI / (2 * m) as f64).tan();
            (-t * t).exp() * (l * l + t * t)
        };
        let f0 = f(0);
        let samples: Vec<f64> = (1..m).map(f).collect();

        let mut a = [0.0; FADDEEVA_TERMS];
        for (j, coeff) in a.iter_mut().enumerate() {
            let order = (j + 1) as f64;
            let sum: f64 = samples
                .iter()
                .enumerate()
                .map(|(i, &fk)| fk * ((i + 1) as f64 * order * PI / m as f64).cos())
                .sum();
            *coeff = (f0 + 2.0 * sum) / (2 * m) as f64;
        }
        (l, a)
    })
}

/// Faddeeva function `w(z) = exp(-z^2) erfc(-iz)` for `Im z >= 0`.
///
/// Weideman (1994) rational expansion with 32 terms; relative accuracy is
/// better than 1e-12 over the upper half plane.
pub fn faddeeva(z: Complex64) -> Complex64 {
    let (l, a) = faddeeva_coefficients();
    let iz = Complex64::i() * z;
    let denom = Complex64::new(*l, 0.0) - iz;
    let zz = (Complex64::new(*l, 0.0) + iz) / denom;

    let p = a
        .iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * zz + c);

    2.0 * p / (denom * denom) + FRAC_1_SQRT_PI / denom
}
