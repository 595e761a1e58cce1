use std::f64::consts::PI;

use approx::assert_relative_eq;
use xrayyield::profile::ProfileKind;
use xrayyield::{VoigtProfile, voigt};

fn gaussian(x: f64, mean: f64, sigma: f64) -> f64 {
    (-0.5 * ((x - mean) / sigma).powi(2)).exp() / (sigma * (2.0 * PI).sqrt())
}

fn lorentzian(x: f64, mean: f64, gamma: f64) -> f64 {
    (gamma / PI) / ((x - mean).powi(2) + gamma * gamma)
}

#[test]
fn test_zero_lorentz_width_is_gaussian() {
    let x: Vec<f64> = (0..200).map(|i| 6380.0 + i as f64 * 0.25).collect();
    let values = voigt(&x, 6404.0, 0.0, 3.4);
    for (xi, v) in x.iter().zip(&values) {
        assert_relative_eq!(*v, gaussian(*xi, 6404.0, 3.4), max_relative = 1e-12);
    }
}

#[test]
fn test_zero_gauss_width_is_lorentzian() {
    let x: Vec<f64> = (0..200).map(|i| 990.0 + i as f64 * 0.1).collect();
    let values = voigt(&x, 1000.0, 0.5, 0.0);
    for (xi, v) in x.iter().zip(&values) {
        assert_relative_eq!(*v, lorentzian(*xi, 1000.0, 0.5), max_relative = 1e-12);
    }
}

#[test]
fn test_both_widths_zero_gives_zeros() {
    let profile = VoigtProfile::new(5.0, 0.0, 0.0);
    assert_eq!(profile.kind(), ProfileKind::Degenerate);
    assert_eq!(profile.evaluate(&[4.0, 5.0, 6.0]), vec![0.0; 3]);
}

#[test]
fn test_voigt_integrates_to_one() {
    // trapezoid over +-2000 with step 0.01; the Lorentzian tails beyond
    // the window hold about 2 * gamma / (pi * 2000)
    let (sigma, gamma) = (1.0, 0.5);
    let step = 0.01;
    let n = 400_000;
    let x: Vec<f64> = (0..=n).map(|i| -2000.0 + i as f64 * step).collect();
    let values = voigt(&x, 0.0, gamma, sigma);
    let integral: f64 = values.windows(2).map(|w| 0.5 * (w[0] + w[1]) * step).sum();
    let tails = 2.0 * gamma / (PI * 2000.0);
    assert_relative_eq!(integral + tails, 1.0, max_relative = 1e-4);
}

#[test]
fn test_voigt_narrow_gauss_approaches_lorentzian() {
    let v = voigt(&[1000.3], 1000.0, 0.5, 1e-4)[0];
    assert_relative_eq!(v, lorentzian(1000.3, 1000.0, 0.5), max_relative = 1e-4);
}

#[test]
fn test_single_point_lorentzian_peak() {
    let v = voigt(&[1.0], 1.0, 0.001, 0.0);
    assert_relative_eq!(v[0], 1.0 / (0.001 * PI), max_relative = 1e-12);
}
